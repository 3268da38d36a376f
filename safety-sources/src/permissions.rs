use safety_model::CounterStore;
use safety_model::Fetched;
use safety_model::ModuleClassification;
use safety_model::ModuleKind;
use safety_model::ModuleOption;
use safety_model::UnusedPermissionsStatus;
use safety_model::counter_key;

use crate::checker::CheckDomain;
use crate::checker::Counts;
use crate::error::CheckerError;
use crate::source::ModuleState;

const SITES: &str = "sites";

/// Sites whose unused permissions were revoked automatically.
#[derive(Debug, Clone, Default)]
pub struct UnusedPermissionsState {
    sites: Fetched<u32>,
}

impl UnusedPermissionsState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModuleState for UnusedPermissionsState {
    fn option(&self) -> ModuleOption {
        ModuleOption::UnusedPermissions
    }

    fn domain(&self) -> CheckDomain {
        CheckDomain::UnusedPermissions
    }

    fn restore(&mut self, store: &dyn CounterStore) {
        let raw = store.get_int(&counter_key(self.option(), SITES));
        // Nothing persisted yet: stay unready rather than report unavailable.
        if raw >= 0 {
            self.sites = Fetched::from_count(raw);
        }
    }

    fn apply(&mut self, counts: Counts) -> Result<(), CheckerError> {
        let Counts::UnusedPermissions { sites } = counts else {
            return Err(CheckerError::UnexpectedCounts(CheckDomain::UnusedPermissions));
        };
        self.sites = Fetched::from_count(sites);
        Ok(())
    }

    fn invalidate(&mut self) {
        self.sites.invalidate();
    }

    fn persist(&self, store: &dyn CounterStore) {
        store.set_int(&counter_key(self.option(), SITES), self.sites.to_count());
    }

    fn classify(&self) -> Option<ModuleClassification> {
        let status = match self.sites {
            Fetched::Pending => return None,
            Fetched::Unavailable => UnusedPermissionsStatus::Unavailable,
            Fetched::Value(0) => UnusedPermissionsStatus::Clear,
            Fetched::Value(sites) => UnusedPermissionsStatus::Revoked { sites },
        };
        Some(ModuleClassification::new(
            ModuleOption::UnusedPermissions,
            ModuleKind::UnusedPermissions { status },
            false,
        ))
    }
}
