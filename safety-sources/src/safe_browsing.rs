use safety_model::CounterStore;
use safety_model::Fetched;
use safety_model::ModuleClassification;
use safety_model::ModuleKind;
use safety_model::ModuleOption;
use safety_model::SafeBrowsingStatus;

use crate::checker::CheckDomain;
use crate::checker::Counts;
use crate::checker::SafeBrowsingMode;
use crate::error::CheckerError;
use crate::source::ModuleState;

/// Safe Browsing protection level, possibly fixed by enterprise policy.
#[derive(Debug, Clone, Default)]
pub struct SafeBrowsingState {
    mode: Fetched<SafeBrowsingMode>,
    managed: bool,
}

impl SafeBrowsingState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModuleState for SafeBrowsingState {
    fn option(&self) -> ModuleOption {
        ModuleOption::SafeBrowsing
    }

    fn domain(&self) -> CheckDomain {
        CheckDomain::SafeBrowsing
    }

    fn restore(&mut self, _store: &dyn CounterStore) {}

    fn apply(&mut self, counts: Counts) -> Result<(), CheckerError> {
        let Counts::SafeBrowsing { mode, managed } = counts else {
            return Err(CheckerError::UnexpectedCounts(CheckDomain::SafeBrowsing));
        };
        self.mode = Fetched::Value(mode);
        self.managed = managed;
        Ok(())
    }

    fn invalidate(&mut self) {
        self.mode.invalidate();
    }

    fn persist(&self, _store: &dyn CounterStore) {}

    fn classify(&self) -> Option<ModuleClassification> {
        let status = match self.mode {
            Fetched::Pending => return None,
            Fetched::Unavailable => SafeBrowsingStatus::Unavailable,
            Fetched::Value(SafeBrowsingMode::Off) => SafeBrowsingStatus::Off,
            Fetched::Value(SafeBrowsingMode::Standard) => SafeBrowsingStatus::Standard,
            Fetched::Value(SafeBrowsingMode::Enhanced) => SafeBrowsingStatus::Enhanced,
        };
        Some(ModuleClassification::new(
            ModuleOption::SafeBrowsing,
            ModuleKind::SafeBrowsing { status },
            self.managed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safety_model::Severity;
    use safety_model::StatusIcon;

    #[test]
    fn test_off_is_warning() {
        let mut state = SafeBrowsingState::new();
        state
            .apply(Counts::SafeBrowsing {
                mode: SafeBrowsingMode::Off,
                managed: false,
            })
            .unwrap();
        let classification = state.classify().unwrap();
        assert_eq!(classification.severity, Severity::Warning);
        assert!(!classification.is_managed);
    }

    #[test]
    fn test_managed_off_keeps_warning_with_managed_icon() {
        let mut state = SafeBrowsingState::new();
        state
            .apply(Counts::SafeBrowsing {
                mode: SafeBrowsingMode::Off,
                managed: true,
            })
            .unwrap();
        let classification = state.classify().unwrap();
        assert_eq!(classification.severity, Severity::Warning);
        assert_eq!(
            StatusIcon::for_state(classification.severity, classification.is_managed),
            StatusIcon::Managed
        );
    }

    #[test]
    fn test_standard_and_enhanced_are_safe() {
        for mode in [SafeBrowsingMode::Standard, SafeBrowsingMode::Enhanced] {
            let mut state = SafeBrowsingState::new();
            state
                .apply(Counts::SafeBrowsing {
                    mode,
                    managed: false,
                })
                .unwrap();
            assert_eq!(state.classify().unwrap().severity, Severity::Safe);
        }
    }
}
