use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Result;

/// Which check a [`SecurityChecker`] call concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckDomain {
    AccountPasswords,
    LocalPasswords,
    Update,
    SafeBrowsing,
    UnusedPermissions,
    NotificationReview,
}

impl CheckDomain {
    pub fn key(self) -> &'static str {
        match self {
            CheckDomain::AccountPasswords => "account_passwords",
            CheckDomain::LocalPasswords => "local_passwords",
            CheckDomain::Update => "update",
            CheckDomain::SafeBrowsing => "safe_browsing",
            CheckDomain::UnusedPermissions => "unused_permissions",
            CheckDomain::NotificationReview => "notification_review",
        }
    }
}

impl std::fmt::Display for CheckDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

fn default_true() -> bool {
    true
}

/// Raw password counts as reported by the checker. A negative count means
/// the provider could not compute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCounts {
    pub total: i64,
    pub compromised: i64,
    pub weak: i64,
    pub reused: i64,
    #[serde(default = "default_true")]
    pub signed_in: bool,
    #[serde(default)]
    pub saving_disabled_by_policy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateState {
    UpToDate,
    UpdateAvailable,
    UnsupportedOsVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeBrowsingMode {
    Off,
    Standard,
    Enhanced,
}

/// Payload of a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Counts {
    Passwords(PasswordCounts),
    Update {
        state: UpdateState,
    },
    SafeBrowsing {
        mode: SafeBrowsingMode,
        #[serde(default)]
        managed: bool,
    },
    UnusedPermissions {
        sites: i64,
    },
    NotificationReview {
        sites: i64,
    },
}

/// The opaque provider that performs the actual security checks.
///
/// `run_checkup` asks the provider to recompute; it may be skipped by the
/// provider's own cooldown without reporting an error, so callers always
/// follow it with `fetch_counts`.
#[async_trait]
pub trait SecurityChecker: Send + Sync {
    async fn fetch_counts(&self, domain: CheckDomain) -> Result<Counts>;

    async fn run_checkup(&self, domain: CheckDomain) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_counts_defaults() {
        let counts: Counts = serde_json::from_str(
            r#"{"kind":"passwords","total":3,"compromised":-1,"weak":2,"reused":0}"#,
        )
        .unwrap();
        assert_eq!(
            counts,
            Counts::Passwords(PasswordCounts {
                total: 3,
                compromised: -1,
                weak: 2,
                reused: 0,
                signed_in: true,
                saving_disabled_by_policy: false,
            })
        );
    }

    #[test]
    fn test_safe_browsing_counts_parse() {
        let json = r#"{"kind":"safe_browsing","mode":"off","managed":true}"#;
        let counts: Counts = serde_json::from_str(json).unwrap();
        assert_eq!(
            counts,
            Counts::SafeBrowsing {
                mode: SafeBrowsingMode::Off,
                managed: true,
            }
        );
    }

    #[test]
    fn test_domain_display() {
        assert_eq!(CheckDomain::NotificationReview.to_string(), "notification_review");
    }
}
