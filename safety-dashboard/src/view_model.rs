use safety_model::ModuleClassification;
use safety_model::ModuleOption;
use serde::Deserialize;
use serde::Serialize;

use crate::mediator::ModuleRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardEntry {
    pub option: ModuleOption,
    pub classification: ModuleClassification,
    pub record: ModuleRecord,
    pub expanded: bool,
    pub order: u32,
    pub loading: bool,
}

/// Everything an observer needs to draw the dashboard. Entries are sorted by
/// `order`; unclassified modules are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardViewModel {
    pub entries: Vec<DashboardEntry>,
    pub has_unmanaged_warning: bool,
    pub browser_safe: bool,
    /// Modules showing the loading indicator, classified or not.
    pub loading: Vec<ModuleOption>,
}

impl DashboardViewModel {
    pub fn entry(&self, option: ModuleOption) -> Option<&DashboardEntry> {
        self.entries.iter().find(|entry| entry.option == option)
    }

    pub fn order(&self) -> Vec<ModuleOption> {
        self.entries.iter().map(|entry| entry.option).collect()
    }
}
