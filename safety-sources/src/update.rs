use safety_model::CounterStore;
use safety_model::Fetched;
use safety_model::ModuleClassification;
use safety_model::ModuleKind;
use safety_model::ModuleOption;
use safety_model::UpdateStatus;

use crate::checker::CheckDomain;
use crate::checker::Counts;
use crate::checker::UpdateState;
use crate::error::CheckerError;
use crate::source::ModuleState;

/// Browser update status. Live state only, nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct UpdateCheckState {
    state: Fetched<UpdateState>,
}

impl UpdateCheckState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModuleState for UpdateCheckState {
    fn option(&self) -> ModuleOption {
        ModuleOption::UpdateCheck
    }

    fn domain(&self) -> CheckDomain {
        CheckDomain::Update
    }

    fn restore(&mut self, _store: &dyn CounterStore) {}

    fn apply(&mut self, counts: Counts) -> Result<(), CheckerError> {
        let Counts::Update { state } = counts else {
            return Err(CheckerError::UnexpectedCounts(CheckDomain::Update));
        };
        self.state = Fetched::Value(state);
        Ok(())
    }

    fn invalidate(&mut self) {
        self.state.invalidate();
    }

    fn persist(&self, _store: &dyn CounterStore) {}

    fn classify(&self) -> Option<ModuleClassification> {
        let status = match self.state {
            Fetched::Pending => return None,
            Fetched::Unavailable => UpdateStatus::Unavailable,
            Fetched::Value(UpdateState::UpToDate) => UpdateStatus::UpToDate,
            Fetched::Value(UpdateState::UpdateAvailable) => UpdateStatus::UpdateAvailable,
            Fetched::Value(UpdateState::UnsupportedOsVersion) => UpdateStatus::UnsupportedOsVersion,
        };
        Some(ModuleClassification::new(
            ModuleOption::UpdateCheck,
            ModuleKind::Update { status },
            false,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safety_model::Severity;

    fn severity_after(counts: Counts) -> Severity {
        let mut state = UpdateCheckState::new();
        state.apply(counts).unwrap();
        state.classify().unwrap().severity
    }

    #[test]
    fn test_pending_is_unready() {
        assert!(UpdateCheckState::new().classify().is_none());
    }

    #[test]
    fn test_update_ladder() {
        assert_eq!(
            severity_after(Counts::Update {
                state: UpdateState::UpdateAvailable
            }),
            Severity::Warning
        );
        assert_eq!(
            severity_after(Counts::Update {
                state: UpdateState::UnsupportedOsVersion
            }),
            Severity::Info
        );
        assert_eq!(
            severity_after(Counts::Update {
                state: UpdateState::UpToDate
            }),
            Severity::Safe
        );
    }

    #[test]
    fn test_failed_fetch_is_unavailable() {
        let mut state = UpdateCheckState::new();
        state.invalidate();
        assert_eq!(state.classify().unwrap().severity, Severity::Unavailable);
    }
}
