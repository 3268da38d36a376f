use serde::Deserialize;
use serde::Serialize;

use crate::action::ModuleAction;
use crate::copy::copy_for;
use crate::kind::ModuleKind;
use crate::module::ModuleOption;
use crate::severity::Severity;

/// The current classification of one module.
///
/// Immutable: every input change produces a whole new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleClassification {
    pub option: ModuleOption,
    pub kind: ModuleKind,
    pub severity: Severity,
    pub is_managed: bool,
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_action: Option<ModuleAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_action: Option<ModuleAction>,
}

impl ModuleClassification {
    pub fn new(option: ModuleOption, kind: ModuleKind, is_managed: bool) -> Self {
        let copy = copy_for(&kind, is_managed);
        Self {
            option,
            kind,
            severity: kind.severity(),
            is_managed,
            title: copy.title,
            summary: copy.summary,
            primary_action: copy.primary_action,
            secondary_action: copy.secondary_action,
        }
    }

    /// Unmanaged warning: the only state that collapses other modules.
    pub fn is_actionable_warning(&self) -> bool {
        self.severity == Severity::Warning && !self.is_managed
    }
}
