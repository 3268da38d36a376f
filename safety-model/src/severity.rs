use serde::Deserialize;
use serde::Serialize;

/// Normalized urgency of a dashboard module.
///
/// Declaration order is the sort order: `Warning` is the least safe and sorts
/// first, `Safe` sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Unavailable,
    Info,
    Safe,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Warning,
        Severity::Unavailable,
        Severity::Info,
        Severity::Safe,
    ];

    /// Numeric rank matching declaration order (Warning = 0 .. Safe = 3).
    pub fn rank(self) -> u32 {
        match self {
            Severity::Warning => 0,
            Severity::Unavailable => 1,
            Severity::Info => 2,
            Severity::Safe => 3,
        }
    }
}

/// Icon shown next to a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    Safe,
    Warning,
    Info,
    /// Policy-managed module in any state other than safe.
    Managed,
}

impl StatusIcon {
    pub fn for_state(severity: Severity, is_managed: bool) -> Self {
        match severity {
            Severity::Safe => StatusIcon::Safe,
            _ if is_managed => StatusIcon::Managed,
            Severity::Warning => StatusIcon::Warning,
            Severity::Unavailable | Severity::Info => StatusIcon::Info,
        }
    }
}
