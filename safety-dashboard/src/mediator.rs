use safety_model::ActionRequest;
use safety_model::ButtonSlot;
use safety_model::ModuleAction;
use safety_model::ModuleClassification;
use safety_model::ModuleOption;
use safety_model::Severity;
use safety_model::StatusIcon;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonRecord {
    pub label: String,
    pub action: ModuleAction,
}

impl ButtonRecord {
    fn for_action(action: ModuleAction) -> Self {
        Self {
            label: action.label().to_string(),
            action,
        }
    }
}

/// Presentation record for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub title: String,
    pub summary: String,
    pub icon: StatusIcon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_button: Option<ButtonRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_button: Option<ButtonRecord>,
}

/// Holds the latest classification of one module and turns it into a
/// presentation record.
#[derive(Debug, Clone)]
pub struct ModuleMediator {
    option: ModuleOption,
    classification: Option<ModuleClassification>,
}

impl ModuleMediator {
    pub fn new(option: ModuleOption) -> Self {
        Self {
            option,
            classification: None,
        }
    }

    pub fn option(&self) -> ModuleOption {
        self.option
    }

    /// Returns `false` when the classification is identical to the current
    /// one.
    pub fn update(&mut self, classification: ModuleClassification) -> bool {
        if self.classification.as_ref() == Some(&classification) {
            return false;
        }
        self.classification = Some(classification);
        true
    }

    pub fn classification(&self) -> Option<&ModuleClassification> {
        self.classification.as_ref()
    }

    pub fn severity(&self) -> Option<Severity> {
        self.classification.as_ref().map(|c| c.severity)
    }

    pub fn is_managed(&self) -> bool {
        self.classification.as_ref().is_some_and(|c| c.is_managed)
    }

    pub fn record(&self) -> Option<ModuleRecord> {
        let c = self.classification.as_ref()?;
        Some(ModuleRecord {
            title: c.title.clone(),
            summary: c.summary.clone(),
            icon: StatusIcon::for_state(c.severity, c.is_managed),
            primary_button: c.primary_action.map(ButtonRecord::for_action),
            secondary_button: c.secondary_action.map(ButtonRecord::for_action),
        })
    }

    /// The request for a button press, `None` when the slot has no button.
    pub fn action_request(&self, slot: ButtonSlot) -> Option<ActionRequest> {
        let c = self.classification.as_ref()?;
        let action = match slot {
            ButtonSlot::Primary => c.primary_action,
            ButtonSlot::Secondary => c.secondary_action,
        }?;
        Some(ActionRequest {
            option: self.option,
            action,
            snackbar: action.snackbar(&c.kind),
        })
    }
}
