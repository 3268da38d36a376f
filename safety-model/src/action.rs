use serde::Deserialize;
use serde::Serialize;

use crate::kind::ModuleKind;
use crate::kind::NotificationReviewStatus;
use crate::kind::UnusedPermissionsStatus;
use crate::module::ModuleOption;

/// Remediation or navigation affordance attached to a module button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleAction {
    OpenPasswordManager,
    SignIn,
    UpdateBrowser,
    OpenAppStore,
    TurnOnSafeBrowsing,
    OpenSecuritySettings,
    AcknowledgeRevokedPermissions,
    ViewSites,
    OpenSiteSettings,
    ResetAllNotifications,
    OpenNotificationSettings,
}

impl ModuleAction {
    pub fn label(self) -> &'static str {
        match self {
            ModuleAction::OpenPasswordManager => "Go to Password Manager",
            ModuleAction::SignIn => "Sign in",
            ModuleAction::UpdateBrowser => "Update",
            ModuleAction::OpenAppStore => "Go to app store",
            ModuleAction::TurnOnSafeBrowsing => "Turn on",
            ModuleAction::OpenSecuritySettings => "Go to security settings",
            ModuleAction::AcknowledgeRevokedPermissions => "Got it",
            ModuleAction::ViewSites => "View sites",
            ModuleAction::OpenSiteSettings => "Go to site settings",
            ModuleAction::ResetAllNotifications => "Reset all",
            ModuleAction::OpenNotificationSettings => "Go to notification settings",
        }
    }

    /// One-shot confirmation shown after the action runs, if any.
    pub fn snackbar(self, kind: &ModuleKind) -> Option<Snackbar> {
        match (self, kind) {
            (
                ModuleAction::AcknowledgeRevokedPermissions,
                ModuleKind::UnusedPermissions {
                    status: UnusedPermissionsStatus::Revoked { sites },
                },
            ) => Some(Snackbar {
                message: format!("Permissions review cleared for {}", sites_label(*sites)),
                undoable: true,
            }),
            (
                ModuleAction::ResetAllNotifications,
                ModuleKind::NotificationReview {
                    status: NotificationReviewStatus::ForReview { sites },
                },
            ) => Some(Snackbar {
                message: format!("Notifications reset for {}", sites_label(*sites)),
                undoable: true,
            }),
            _ => None,
        }
    }
}

fn sites_label(sites: u32) -> String {
    if sites == 1 {
        "1 site".to_string()
    } else {
        format!("{sites} sites")
    }
}

/// Which of a module's two buttons was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonSlot {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snackbar {
    pub message: String,
    pub undoable: bool,
}

/// Request emitted when the user presses a module button. The caller performs
/// the navigation or mutation; the engine only exposes the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub option: ModuleOption,
    pub action: ModuleAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snackbar: Option<Snackbar>,
}
