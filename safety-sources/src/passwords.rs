//! Password health for one store (account or local).

use safety_model::CounterStore;
use safety_model::Fetched;
use safety_model::ModuleClassification;
use safety_model::ModuleKind;
use safety_model::ModuleOption;
use safety_model::PasswordScope;
use safety_model::PasswordStatus;
use safety_model::counter_key;
use serde::Deserialize;
use serde::Serialize;

use crate::checker::CheckDomain;
use crate::checker::Counts;
use crate::error::CheckerError;
use crate::source::ModuleState;

const COUNTER_FIELDS: [&str; 4] = ["total", "compromised", "weak", "reused"];

/// Latest raw inputs of a password source, as consumed by the unified
/// reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordSnapshot {
    pub scope: PasswordScope,
    pub signed_out: bool,
    pub total: Fetched<u32>,
    pub compromised: Fetched<u32>,
    pub weak: Fetched<u32>,
    pub reused: Fetched<u32>,
    pub managed: bool,
}

impl PasswordSnapshot {
    /// Nothing to check: signed out or no saved passwords.
    pub fn has_no_data(&self) -> bool {
        self.signed_out || self.total.is_zero()
    }

    /// Has passwords but the total or compromised count could not be
    /// computed.
    pub fn is_unavailable(&self) -> bool {
        !self.has_no_data() && (self.total.value().is_none() || self.compromised.value().is_none())
    }
}

#[derive(Debug, Clone)]
pub struct PasswordSourceState {
    scope: PasswordScope,
    signed_in: Fetched<bool>,
    total: Fetched<u32>,
    compromised: Fetched<u32>,
    weak: Fetched<u32>,
    reused: Fetched<u32>,
    managed: bool,
    weak_and_reused_enabled: bool,
}

impl PasswordSourceState {
    /// Passwords saved to the signed-in account. Sign-in is a prerequisite.
    pub fn account(weak_and_reused_enabled: bool) -> Self {
        Self::new(PasswordScope::Account, Fetched::Pending, weak_and_reused_enabled)
    }

    /// Passwords saved on this device. No prerequisite.
    pub fn local(weak_and_reused_enabled: bool) -> Self {
        Self::new(PasswordScope::Local, Fetched::Value(true), weak_and_reused_enabled)
    }

    fn new(scope: PasswordScope, signed_in: Fetched<bool>, weak_and_reused_enabled: bool) -> Self {
        Self {
            scope,
            signed_in,
            total: Fetched::Pending,
            compromised: Fetched::Pending,
            weak: Fetched::Pending,
            reused: Fetched::Pending,
            managed: false,
            weak_and_reused_enabled,
        }
    }

    pub fn scope(&self) -> PasswordScope {
        self.scope
    }

    /// Sign-in signal. Ignored for the local store.
    pub fn set_signed_in(&mut self, signed_in: bool) {
        if self.scope == PasswordScope::Account {
            self.signed_in = Fetched::Value(signed_in);
        }
    }

    /// Counts fetched before a sign-out belong to an account the user has
    /// left, so a signed-out snapshot reports none.
    pub fn snapshot(&self) -> PasswordSnapshot {
        let signed_out = matches!(self.signed_in, Fetched::Value(false));
        let counted = |field: Fetched<u32>| if signed_out { Fetched::Pending } else { field };
        PasswordSnapshot {
            scope: self.scope,
            signed_out,
            total: counted(self.total),
            compromised: counted(self.compromised),
            weak: counted(self.weak),
            reused: counted(self.reused),
            managed: self.managed,
        }
    }

    fn is_ready(&self) -> bool {
        !(self.signed_in.is_pending()
            || self.total.is_pending()
            || self.compromised.is_pending()
            || self.weak.is_pending()
            || self.reused.is_pending())
    }

    fn counters_mut(&mut self) -> [&mut Fetched<u32>; 4] {
        [
            &mut self.total,
            &mut self.compromised,
            &mut self.weak,
            &mut self.reused,
        ]
    }
}

impl ModuleState for PasswordSourceState {
    fn option(&self) -> ModuleOption {
        match self.scope {
            PasswordScope::Account => ModuleOption::AccountPasswords,
            PasswordScope::Local => ModuleOption::LocalPasswords,
            PasswordScope::Unified => ModuleOption::UnifiedPasswords,
        }
    }

    fn domain(&self) -> CheckDomain {
        match self.scope {
            PasswordScope::Local => CheckDomain::LocalPasswords,
            PasswordScope::Account | PasswordScope::Unified => CheckDomain::AccountPasswords,
        }
    }

    fn restore(&mut self, store: &dyn CounterStore) {
        let option = self.option();
        for (field, slot) in COUNTER_FIELDS.iter().zip(self.counters_mut()) {
            let raw = store.get_int(&counter_key(option, field));
            if raw >= 0 {
                *slot = Fetched::from_count(raw);
            }
        }
    }

    fn apply(&mut self, counts: Counts) -> Result<(), CheckerError> {
        let Counts::Passwords(counts) = counts else {
            return Err(CheckerError::UnexpectedCounts(self.domain()));
        };
        if self.scope == PasswordScope::Account {
            self.signed_in = Fetched::Value(counts.signed_in);
        }
        self.total = Fetched::from_count(counts.total);
        self.compromised = Fetched::from_count(counts.compromised);
        self.weak = Fetched::from_count(counts.weak);
        self.reused = Fetched::from_count(counts.reused);
        self.managed = counts.saving_disabled_by_policy;
        Ok(())
    }

    fn invalidate(&mut self) {
        for slot in self.counters_mut() {
            slot.invalidate();
        }
        // A failed fetch says nothing about sign-in, but the ladder needs it
        // resolved to report the failure.
        if self.signed_in.is_pending() {
            self.signed_in = Fetched::Value(true);
        }
    }

    fn persist(&self, store: &dyn CounterStore) {
        let option = self.option();
        let values = [self.total, self.compromised, self.weak, self.reused];
        for (field, value) in COUNTER_FIELDS.iter().zip(values) {
            store.set_int(&counter_key(option, field), value.to_count());
        }
    }

    fn classify(&self) -> Option<ModuleClassification> {
        if !self.is_ready() {
            return None;
        }
        let status = classify_passwords(&self.snapshot(), self.weak_and_reused_enabled);
        Some(ModuleClassification::new(
            self.option(),
            ModuleKind::Passwords {
                scope: self.scope,
                status,
            },
            self.managed,
        ))
    }
}

/// Decision ladder for a single password store. First match wins.
///
/// When the compromised count is unavailable, positive reused or weak counts
/// still yield an informational result rather than an unavailable one.
pub fn classify_passwords(
    snapshot: &PasswordSnapshot,
    weak_and_reused_enabled: bool,
) -> PasswordStatus {
    if snapshot.signed_out {
        return PasswordStatus::SignedOut;
    }
    let Some(&total) = snapshot.total.value() else {
        return PasswordStatus::Unavailable;
    };
    if total == 0 {
        return PasswordStatus::NoPasswords;
    }

    let refinement = if weak_and_reused_enabled {
        refine(snapshot)
    } else {
        None
    };

    match snapshot.compromised {
        Fetched::Value(count) if count > 0 => PasswordStatus::Compromised { count },
        Fetched::Value(_) => refinement.unwrap_or(PasswordStatus::Safe),
        Fetched::Pending | Fetched::Unavailable => match refinement {
            Some(status) => status,
            None if weak_and_reused_enabled
                && snapshot.weak.is_zero()
                && snapshot.reused.is_zero() =>
            {
                PasswordStatus::CompromisedUnknown
            }
            None => PasswordStatus::Unavailable,
        },
    }
}

fn refine(snapshot: &PasswordSnapshot) -> Option<PasswordStatus> {
    if let Some(count) = snapshot.reused.positive() {
        return Some(PasswordStatus::Reused { count });
    }
    snapshot
        .weak
        .positive()
        .map(|count| PasswordStatus::Weak { count })
}
