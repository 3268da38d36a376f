use serde::Deserialize;
use serde::Serialize;

/// Dashboard slots.
///
/// The declaration order is a published contract: it is the tie-break used
/// when ordering modules of equal severity, so variants must never be
/// reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleOption {
    UpdateCheck,
    AccountPasswords,
    SafeBrowsing,
    UnusedPermissions,
    NotificationReview,
    UnifiedPasswords,
    LocalPasswords,
}

impl ModuleOption {
    pub const ALL: [ModuleOption; 7] = [
        ModuleOption::UpdateCheck,
        ModuleOption::AccountPasswords,
        ModuleOption::SafeBrowsing,
        ModuleOption::UnusedPermissions,
        ModuleOption::NotificationReview,
        ModuleOption::UnifiedPasswords,
        ModuleOption::LocalPasswords,
    ];

    /// Total number of module options (the `N` of the ordering formula).
    pub const COUNT: u32 = 7;

    pub fn index(self) -> u32 {
        match self {
            ModuleOption::UpdateCheck => 0,
            ModuleOption::AccountPasswords => 1,
            ModuleOption::SafeBrowsing => 2,
            ModuleOption::UnusedPermissions => 3,
            ModuleOption::NotificationReview => 4,
            ModuleOption::UnifiedPasswords => 5,
            ModuleOption::LocalPasswords => 6,
        }
    }

    /// Stable key used for persisted counters and logs.
    pub fn key(self) -> &'static str {
        match self {
            ModuleOption::UpdateCheck => "update_check",
            ModuleOption::AccountPasswords => "account_passwords",
            ModuleOption::SafeBrowsing => "safe_browsing",
            ModuleOption::UnusedPermissions => "unused_permissions",
            ModuleOption::NotificationReview => "notification_review",
            ModuleOption::UnifiedPasswords => "unified_passwords",
            ModuleOption::LocalPasswords => "local_passwords",
        }
    }
}

impl std::fmt::Display for ModuleOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_follows_declaration_order() {
        for (position, option) in ModuleOption::ALL.iter().enumerate() {
            assert_eq!(option.index() as usize, position, "{option}");
        }
        assert_eq!(ModuleOption::ALL.len() as u32, ModuleOption::COUNT);
    }

    #[test]
    fn test_derived_ord_agrees_with_index() {
        let mut sorted = ModuleOption::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, ModuleOption::ALL.to_vec());
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<&str> = ModuleOption::ALL.iter().map(|o| o.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ModuleOption::ALL.len());
    }
}
