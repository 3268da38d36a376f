//! Copy table: title, summary and button selectors keyed by `ModuleKind`.

use serde::Deserialize;
use serde::Serialize;

use crate::action::ModuleAction;
use crate::kind::ModuleKind;
use crate::kind::NotificationReviewStatus;
use crate::kind::PasswordScope;
use crate::kind::PasswordStatus;
use crate::kind::SafeBrowsingStatus;
use crate::kind::UnusedPermissionsStatus;
use crate::kind::UpdateStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCopy {
    pub title: String,
    pub summary: String,
    pub primary_action: Option<ModuleAction>,
    pub secondary_action: Option<ModuleAction>,
}

impl ModuleCopy {
    fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        primary_action: Option<ModuleAction>,
        secondary_action: Option<ModuleAction>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            primary_action,
            secondary_action,
        }
    }
}

const TRY_AGAIN_LATER: &str = "Try again later";

/// Looks up the copy for a classification branch.
///
/// A policy-managed module keeps its title but loses the remediation action:
/// the summary names the administrator and the only button navigates to the
/// relevant settings page.
pub fn copy_for(kind: &ModuleKind, is_managed: bool) -> ModuleCopy {
    let copy = match kind {
        ModuleKind::Passwords { scope, status } => password_copy(*scope, *status),
        ModuleKind::Update { status } => update_copy(*status),
        ModuleKind::SafeBrowsing { status } => safe_browsing_copy(*status),
        ModuleKind::UnusedPermissions { status } => unused_permissions_copy(*status),
        ModuleKind::NotificationReview { status } => notification_review_copy(*status),
    };
    if is_managed {
        managed(kind, copy)
    } else {
        copy
    }
}

fn managed(kind: &ModuleKind, copy: ModuleCopy) -> ModuleCopy {
    let (summary, navigation) = match kind {
        ModuleKind::Passwords { .. } => (
            "Password saving is managed by your administrator",
            ModuleAction::OpenPasswordManager,
        ),
        ModuleKind::SafeBrowsing {
            status: SafeBrowsingStatus::Off,
        } => (
            "Safe Browsing is turned off by your administrator",
            ModuleAction::OpenSecuritySettings,
        ),
        ModuleKind::SafeBrowsing { .. } => (
            "Safe Browsing is managed by your administrator",
            ModuleAction::OpenSecuritySettings,
        ),
        // Only password saving and Safe Browsing can be set by policy.
        _ => return copy,
    };
    ModuleCopy::new(copy.title, summary, None, Some(navigation))
}

fn password_copy(scope: PasswordScope, status: PasswordStatus) -> ModuleCopy {
    use ModuleAction::OpenPasswordManager;

    let noun = match scope {
        PasswordScope::Account => "account passwords",
        PasswordScope::Local => "passwords on this device",
        PasswordScope::Unified => "passwords",
    };
    match status {
        PasswordStatus::SignedOut => ModuleCopy::new(
            "Password check unavailable",
            "Sign in to check your saved passwords",
            None,
            Some(ModuleAction::SignIn),
        ),
        PasswordStatus::NoPasswords => ModuleCopy::new(
            format!("No saved {noun}"),
            "Save passwords to check them for security issues",
            None,
            Some(OpenPasswordManager),
        ),
        PasswordStatus::Unavailable => ModuleCopy::new(
            "Password check unavailable",
            TRY_AGAIN_LATER,
            None,
            Some(OpenPasswordManager),
        ),
        PasswordStatus::CompromisedUnknown => ModuleCopy::new(
            "No reused or weak passwords",
            "Compromised password check unavailable. Try again later",
            None,
            Some(OpenPasswordManager),
        ),
        PasswordStatus::Compromised { count } => ModuleCopy::new(
            counted(count, "compromised password", "compromised passwords"),
            format!("Change them now to keep your {noun} safe"),
            Some(OpenPasswordManager),
            None,
        ),
        PasswordStatus::Reused { count } => ModuleCopy::new(
            counted(count, "reused password", "reused passwords"),
            "Create unique passwords",
            Some(OpenPasswordManager),
            None,
        ),
        PasswordStatus::Weak { count } => ModuleCopy::new(
            counted(count, "weak password", "weak passwords"),
            "Create strong passwords",
            Some(OpenPasswordManager),
            None,
        ),
        PasswordStatus::Safe => ModuleCopy::new(
            format!("No compromised {noun}"),
            "Checked recently",
            None,
            Some(OpenPasswordManager),
        ),
    }
}

fn update_copy(status: UpdateStatus) -> ModuleCopy {
    match status {
        UpdateStatus::UpToDate => ModuleCopy::new(
            "Browser is up to date",
            "You're using the latest version",
            None,
            Some(ModuleAction::OpenAppStore),
        ),
        UpdateStatus::UpdateAvailable => ModuleCopy::new(
            "Update available",
            "Update now to get the latest security fixes",
            Some(ModuleAction::UpdateBrowser),
            None,
        ),
        UpdateStatus::UnsupportedOsVersion => ModuleCopy::new(
            "Updates are no longer supported",
            "This version of your operating system no longer receives browser updates",
            None,
            None,
        ),
        UpdateStatus::Unavailable => ModuleCopy::new(
            "Update check unavailable",
            TRY_AGAIN_LATER,
            None,
            Some(ModuleAction::OpenAppStore),
        ),
    }
}

fn safe_browsing_copy(status: SafeBrowsingStatus) -> ModuleCopy {
    use ModuleAction::OpenSecuritySettings;

    match status {
        SafeBrowsingStatus::Off => ModuleCopy::new(
            "No protection",
            "You're not protected against dangerous sites, downloads and extensions",
            Some(ModuleAction::TurnOnSafeBrowsing),
            None,
        ),
        SafeBrowsingStatus::Standard => ModuleCopy::new(
            "Standard protection is on",
            "You're protected against known dangerous sites",
            None,
            Some(OpenSecuritySettings),
        ),
        SafeBrowsingStatus::Enhanced => ModuleCopy::new(
            "Enhanced protection is on",
            "You're getting the strongest protection against dangerous sites",
            None,
            Some(OpenSecuritySettings),
        ),
        SafeBrowsingStatus::Unavailable => ModuleCopy::new(
            "Safe Browsing status unavailable",
            TRY_AGAIN_LATER,
            None,
            Some(OpenSecuritySettings),
        ),
    }
}

fn unused_permissions_copy(status: UnusedPermissionsStatus) -> ModuleCopy {
    match status {
        UnusedPermissionsStatus::Clear => ModuleCopy::new(
            "No permissions to review",
            "Permissions are removed from sites you haven't visited in a while",
            None,
            Some(ModuleAction::OpenSiteSettings),
        ),
        UnusedPermissionsStatus::Revoked { sites } => ModuleCopy::new(
            format!(
                "Permissions removed from {}",
                counted(sites, "site", "sites")
            ),
            "To protect your data, permissions were removed from sites you haven't visited recently",
            Some(ModuleAction::AcknowledgeRevokedPermissions),
            Some(ModuleAction::ViewSites),
        ),
        UnusedPermissionsStatus::Unavailable => ModuleCopy::new(
            "Permissions review unavailable",
            TRY_AGAIN_LATER,
            None,
            Some(ModuleAction::OpenSiteSettings),
        ),
    }
}

fn notification_review_copy(status: NotificationReviewStatus) -> ModuleCopy {
    match status {
        NotificationReviewStatus::Clear => ModuleCopy::new(
            "No notifications to review",
            "No sites are sending a lot of notifications",
            None,
            Some(ModuleAction::OpenNotificationSettings),
        ),
        NotificationReviewStatus::ForReview { sites } => ModuleCopy::new(
            format!(
                "Review {} sending a lot of notifications",
                counted(sites, "site", "sites")
            ),
            "You can stop these sites from sending notifications",
            Some(ModuleAction::ResetAllNotifications),
            Some(ModuleAction::ViewSites),
        ),
        NotificationReviewStatus::Unavailable => ModuleCopy::new(
            "Notification review unavailable",
            TRY_AGAIN_LATER,
            None,
            Some(ModuleAction::OpenNotificationSettings),
        ),
    }
}

fn counted(count: u32, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}
