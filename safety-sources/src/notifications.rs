use safety_model::CounterStore;
use safety_model::Fetched;
use safety_model::ModuleClassification;
use safety_model::ModuleKind;
use safety_model::ModuleOption;
use safety_model::NotificationReviewStatus;
use safety_model::counter_key;

use crate::checker::CheckDomain;
use crate::checker::Counts;
use crate::error::CheckerError;
use crate::source::ModuleState;

const SITES: &str = "sites";

/// Sites sending a lot of notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationReviewState {
    sites: Fetched<u32>,
}

impl NotificationReviewState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModuleState for NotificationReviewState {
    fn option(&self) -> ModuleOption {
        ModuleOption::NotificationReview
    }

    fn domain(&self) -> CheckDomain {
        CheckDomain::NotificationReview
    }

    fn restore(&mut self, store: &dyn CounterStore) {
        let raw = store.get_int(&counter_key(self.option(), SITES));
        if raw >= 0 {
            self.sites = Fetched::from_count(raw);
        }
    }

    fn apply(&mut self, counts: Counts) -> Result<(), CheckerError> {
        let Counts::NotificationReview { sites } = counts else {
            return Err(CheckerError::UnexpectedCounts(CheckDomain::NotificationReview));
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
            Fetched::Unavailable => NotificationReviewStatus::Unavailable,
            Fetched::Value(0) => NotificationReviewStatus::Clear,
            Fetched::Value(sites) => NotificationReviewStatus::ForReview { sites },
        };
        Some(ModuleClassification::new(
            ModuleOption::NotificationReview,
            ModuleKind::NotificationReview { status },
            false,
        ))
    }
}
