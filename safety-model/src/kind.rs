//! Decision-table branches for every module.
//!
//! A `ModuleKind` names the branch that produced a classification. Severity,
//! copy and actions are all derived from it, so each branch is data rather
//! than a dedicated type.

use serde::Deserialize;
use serde::Serialize;

use crate::severity::Severity;

/// Which password store a password module reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordScope {
    Account,
    Local,
    Unified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum PasswordStatus {
    SignedOut,
    NoPasswords,
    Unavailable,
    /// Compromised check unavailable, but no weak or reused passwords found.
    CompromisedUnknown,
    Compromised { count: u32 },
    Reused { count: u32 },
    Weak { count: u32 },
    Safe,
}

impl PasswordStatus {
    pub fn severity(self) -> Severity {
        match self {
            PasswordStatus::Compromised { .. } => Severity::Warning,
            PasswordStatus::SignedOut
            | PasswordStatus::Unavailable
            | PasswordStatus::CompromisedUnknown => Severity::Unavailable,
            PasswordStatus::NoPasswords
            | PasswordStatus::Reused { .. }
            | PasswordStatus::Weak { .. } => Severity::Info,
            PasswordStatus::Safe => Severity::Safe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    UpToDate,
    UpdateAvailable,
    UnsupportedOsVersion,
    Unavailable,
}

impl UpdateStatus {
    pub fn severity(self) -> Severity {
        match self {
            UpdateStatus::UpdateAvailable => Severity::Warning,
            UpdateStatus::Unavailable => Severity::Unavailable,
            UpdateStatus::UnsupportedOsVersion => Severity::Info,
            UpdateStatus::UpToDate => Severity::Safe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeBrowsingStatus {
    Off,
    Standard,
    Enhanced,
    Unavailable,
}

impl SafeBrowsingStatus {
    pub fn severity(self) -> Severity {
        match self {
            SafeBrowsingStatus::Off => Severity::Warning,
            SafeBrowsingStatus::Unavailable => Severity::Unavailable,
            SafeBrowsingStatus::Standard | SafeBrowsingStatus::Enhanced => Severity::Safe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum UnusedPermissionsStatus {
    Clear,
    Revoked { sites: u32 },
    Unavailable,
}

impl UnusedPermissionsStatus {
    pub fn severity(self) -> Severity {
        match self {
            UnusedPermissionsStatus::Clear => Severity::Safe,
            UnusedPermissionsStatus::Revoked { .. } => Severity::Info,
            UnusedPermissionsStatus::Unavailable => Severity::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum NotificationReviewStatus {
    Clear,
    ForReview { sites: u32 },
    Unavailable,
}

impl NotificationReviewStatus {
    pub fn severity(self) -> Severity {
        match self {
            NotificationReviewStatus::Clear => Severity::Safe,
            NotificationReviewStatus::ForReview { .. } => Severity::Info,
            NotificationReviewStatus::Unavailable => Severity::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "module")]
pub enum ModuleKind {
    Passwords {
        scope: PasswordScope,
        status: PasswordStatus,
    },
    Update {
        status: UpdateStatus,
    },
    SafeBrowsing {
        status: SafeBrowsingStatus,
    },
    UnusedPermissions {
        status: UnusedPermissionsStatus,
    },
    NotificationReview {
        status: NotificationReviewStatus,
    },
}

impl ModuleKind {
    pub fn severity(&self) -> Severity {
        match self {
            ModuleKind::Passwords { status, .. } => status.severity(),
            ModuleKind::Update { status } => status.severity(),
            ModuleKind::SafeBrowsing { status } => status.severity(),
            ModuleKind::UnusedPermissions { status } => status.severity(),
            ModuleKind::NotificationReview { status } => status.severity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_severities() {
        assert_eq!(
            PasswordStatus::Compromised { count: 1 }.severity(),
            Severity::Warning
        );
        assert_eq!(PasswordStatus::SignedOut.severity(), Severity::Unavailable);
        assert_eq!(
            PasswordStatus::CompromisedUnknown.severity(),
            Severity::Unavailable
        );
        assert_eq!(PasswordStatus::NoPasswords.severity(), Severity::Info);
        assert_eq!(PasswordStatus::Reused { count: 2 }.severity(), Severity::Info);
        assert_eq!(PasswordStatus::Weak { count: 2 }.severity(), Severity::Info);
        assert_eq!(PasswordStatus::Safe.severity(), Severity::Safe);
    }

    #[test]
    fn test_site_review_modules_never_warn() {
        let permissions = [
            UnusedPermissionsStatus::Clear,
            UnusedPermissionsStatus::Revoked { sites: 4 },
            UnusedPermissionsStatus::Unavailable,
        ];
        assert!(permissions.iter().all(|s| s.severity() != Severity::Warning));

        let notifications = [
            NotificationReviewStatus::Clear,
            NotificationReviewStatus::ForReview { sites: 4 },
            NotificationReviewStatus::Unavailable,
        ];
        assert!(notifications.iter().all(|s| s.severity() != Severity::Warning));
    }

    #[test]
    fn test_kind_delegates_severity() {
        let kind = ModuleKind::SafeBrowsing {
            status: SafeBrowsingStatus::Off,
        };
        assert_eq!(kind.severity(), Severity::Warning);
        let kind = ModuleKind::Update {
            status: UpdateStatus::UnsupportedOsVersion,
        };
        assert_eq!(kind.severity(), Severity::Info);
    }

    #[test]
    fn test_kind_serialization_is_tagged() {
        let kind = ModuleKind::Passwords {
            scope: PasswordScope::Unified,
            status: PasswordStatus::Weak { count: 3 },
        };
        let json = serde_json::to_value(kind).unwrap();
        assert_eq!(json["module"], "passwords");
        assert_eq!(json["scope"], "unified");
        assert_eq!(json["status"]["status"], "weak");
        assert_eq!(json["status"]["count"], 3);
    }
}
