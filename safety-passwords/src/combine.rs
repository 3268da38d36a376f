//! Priority table merging the account and local password stores.

use safety_model::Fetched;
use safety_model::ModuleClassification;
use safety_model::ModuleKind;
use safety_model::ModuleOption;
use safety_model::PasswordScope;
use safety_model::PasswordStatus;
use safety_sources::PasswordSnapshot;

/// Combines both snapshots. First match wins:
///
/// 1. compromised on either side: warning with the summed count
/// 2. both sides unavailable, or one unavailable and the other empty
/// 3. reused on either side
/// 4. weak on either side
/// 5. both sides empty
/// 6. safe
///
/// Unlike the per-store ladder there is no "compromised unknown" branch.
pub fn combine(
    account: &PasswordSnapshot,
    local: &PasswordSnapshot,
    weak_and_reused_enabled: bool,
) -> PasswordStatus {
    if let Some(count) = sum_positive(account.compromised, local.compromised) {
        return PasswordStatus::Compromised { count };
    }

    let account_unavailable = account.is_unavailable();
    let local_unavailable = local.is_unavailable();
    if (account_unavailable && (local_unavailable || local.has_no_data()))
        || (local_unavailable && account.has_no_data())
    {
        return PasswordStatus::Unavailable;
    }

    if weak_and_reused_enabled {
        if let Some(count) = sum_positive(account.reused, local.reused) {
            return PasswordStatus::Reused { count };
        }
        if let Some(count) = sum_positive(account.weak, local.weak) {
            return PasswordStatus::Weak { count };
        }
    }

    if account.has_no_data() && local.has_no_data() {
        return PasswordStatus::NoPasswords;
    }
    PasswordStatus::Safe
}

/// Classification for the unified module. Managed when either store is.
pub fn unified_classification(
    account: &PasswordSnapshot,
    local: &PasswordSnapshot,
    weak_and_reused_enabled: bool,
) -> ModuleClassification {
    ModuleClassification::new(
        ModuleOption::UnifiedPasswords,
        ModuleKind::Passwords {
            scope: PasswordScope::Unified,
            status: combine(account, local, weak_and_reused_enabled),
        },
        account.managed || local.managed,
    )
}

fn sum_positive(a: Fetched<u32>, b: Fetched<u32>) -> Option<u32> {
    match (a.positive(), b.positive()) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
    }
}
