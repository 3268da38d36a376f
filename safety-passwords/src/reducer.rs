use safety_model::ModuleClassification;
use safety_model::ModuleKind;
use safety_model::ModuleOption;
use safety_model::Observer;
use safety_model::ObserverId;
use safety_model::ObserverList;
use safety_model::PasswordScope;
use safety_model::PasswordStatus;
use safety_sources::PasswordSnapshot;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::combine::unified_classification;
use crate::loading::LoadingIndicator;
use crate::loading::LoadingState;
use crate::loading::LoadingTimer;
use crate::loading::TimerOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordSide {
    Account,
    Local,
}

/// Merges the account and local password sources into the unified module.
///
/// Nothing is emitted until both sides have reported. While a check started
/// by [`begin_check`](Self::begin_check) is running, the combined result is
/// routed through the loading indicator.
#[derive(Debug)]
pub struct UnifiedPasswordReducer {
    weak_and_reused_enabled: bool,
    account: Option<PasswordSnapshot>,
    local: Option<PasswordSnapshot>,
    awaiting_account: bool,
    awaiting_local: bool,
    indicator: LoadingIndicator<ModuleClassification>,
    classification: Option<ModuleClassification>,
    observers: ObserverList<ModuleClassification>,
    destroyed: bool,
}

impl UnifiedPasswordReducer {
    pub fn new(weak_and_reused_enabled: bool) -> Self {
        Self {
            weak_and_reused_enabled,
            account: None,
            local: None,
            awaiting_account: false,
            awaiting_local: false,
            indicator: LoadingIndicator::new(),
            classification: None,
            observers: ObserverList::new(),
            destroyed: false,
        }
    }

    pub fn on_account_update(&mut self, snapshot: PasswordSnapshot, completes_check: bool) -> bool {
        self.on_update(PasswordSide::Account, snapshot, completes_check)
    }

    pub fn on_local_update(&mut self, snapshot: PasswordSnapshot, completes_check: bool) -> bool {
        self.on_update(PasswordSide::Local, snapshot, completes_check)
    }

    /// Records a snapshot and recombines. `completes_check` marks the result
    /// of a fetch issued by the running check. Returns whether a new
    /// classification was published.
    pub fn on_update(
        &mut self,
        side: PasswordSide,
        snapshot: PasswordSnapshot,
        completes_check: bool,
    ) -> bool {
        if self.destroyed {
            return false;
        }
        match side {
            PasswordSide::Account => {
                self.account = Some(snapshot);
                self.awaiting_account &= !completes_check;
            }
            PasswordSide::Local => {
                self.local = Some(snapshot);
                self.awaiting_local &= !completes_check;
            }
        }

        let (Some(account), Some(local)) = (&self.account, &self.local) else {
            debug!(?side, "waiting for the other password source");
            return false;
        };
        let combined = unified_classification(account, local, self.weak_and_reused_enabled);

        if !self.indicator.is_loading() {
            return self.publish(combined);
        }
        if self.awaiting_account || self.awaiting_local {
            return false;
        }
        match self.indicator.offer(combined) {
            Some(classification) => self.publish(classification),
            None => false,
        }
    }

    /// Starts a fresh check on both sides and shows the loading indicator.
    /// Returns the generation the caller arms its timers for.
    pub fn begin_check(&mut self) -> u64 {
        self.awaiting_account = true;
        self.awaiting_local = true;
        self.indicator.begin()
    }

    pub fn on_timer(&mut self, timer: LoadingTimer, generation: u64) -> bool {
        if self.destroyed {
            return false;
        }
        match self.indicator.on_timer(timer, generation) {
            TimerOutcome::Ignored | TimerOutcome::KeepWaiting => false,
            TimerOutcome::Release(classification) => self.publish(classification),
            TimerOutcome::TimedOut => {
                warn!(generation, "password check timed out");
                let managed = [self.account, self.local]
                    .iter()
                    .flatten()
                    .any(|snapshot| snapshot.managed);
                self.publish(ModuleClassification::new(
                    ModuleOption::UnifiedPasswords,
                    ModuleKind::Passwords {
                        scope: PasswordScope::Unified,
                        status: PasswordStatus::Unavailable,
                    },
                    managed,
                ))
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.indicator.is_loading()
    }

    pub fn loading_state(&self) -> LoadingState {
        self.indicator.state()
    }

    pub fn current_classification(&self) -> Option<&ModuleClassification> {
        self.classification.as_ref()
    }

    pub fn add_observer(&mut self, observer: Observer<ModuleClassification>) -> ObserverId {
        self.observers.add_with_replay(observer, self.classification.as_ref())
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.observers.clear();
        self.indicator.cancel();
    }

    fn publish(&mut self, classification: ModuleClassification) -> bool {
        if self.classification.as_ref() == Some(&classification) {
            return false;
        }
        debug!(severity = ?classification.severity, "unified password classification changed");
        self.observers.notify(&classification);
        self.classification = Some(classification);
        true
    }
}
