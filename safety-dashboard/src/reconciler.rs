//! Cross-module ordering and expand/collapse policy.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use safety_model::ModuleClassification;
use safety_model::ModuleOption;
use safety_model::Observer;
use safety_model::ObserverId;
use safety_model::ObserverList;
use safety_model::Severity;
use tracing::debug;

use crate::mediator::ModuleMediator;
use crate::view_model::DashboardEntry;
use crate::view_model::DashboardViewModel;

/// Whether any module is in an unmanaged warning state.
pub fn has_unmanaged_warning<I>(states: I) -> bool
where
    I: IntoIterator<Item = (Severity, bool)>,
{
    states
        .into_iter()
        .any(|(severity, managed)| severity == Severity::Warning && !managed)
}

/// A managed warning ranks as info: the user cannot act on it.
pub fn effective_severity(severity: Severity, is_managed: bool) -> Severity {
    if severity == Severity::Warning && is_managed {
        Severity::Info
    } else {
        severity
    }
}

/// Sort key: severity bucket first, declaration order within a bucket.
pub fn order_key(option: ModuleOption, severity: Severity, is_managed: bool) -> u32 {
    option.index() + effective_severity(severity, is_managed).rank() * ModuleOption::COUNT
}

pub fn is_expanded(severity: Severity, is_managed: bool, has_unmanaged_warning: bool) -> bool {
    match severity {
        Severity::Warning => !(is_managed && has_unmanaged_warning),
        Severity::Unavailable | Severity::Info => !has_unmanaged_warning,
        Severity::Safe => false,
    }
}

/// Owns one mediator per registered module and republishes the dashboard
/// whenever a module changes.
#[derive(Debug, Default)]
pub struct DashboardReconciler {
    mediators: BTreeMap<ModuleOption, ModuleMediator>,
    loading: BTreeSet<ModuleOption>,
    view: DashboardViewModel,
    observers: ObserverList<DashboardViewModel>,
}

impl DashboardReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the module was already registered.
    pub fn register(&mut self, option: ModuleOption) -> bool {
        if self.mediators.contains_key(&option) {
            return false;
        }
        self.mediators.insert(option, ModuleMediator::new(option));
        self.recompute();
        true
    }

    pub fn unregister(&mut self, option: ModuleOption) -> bool {
        if self.mediators.remove(&option).is_none() {
            return false;
        }
        self.loading.remove(&option);
        self.recompute();
        true
    }

    pub fn is_registered(&self, option: ModuleOption) -> bool {
        self.mediators.contains_key(&option)
    }

    pub fn registered(&self) -> impl Iterator<Item = ModuleOption> + '_ {
        self.mediators.keys().copied()
    }

    pub fn mediator(&self, option: ModuleOption) -> Option<&ModuleMediator> {
        self.mediators.get(&option)
    }

    /// Routes a classification to its mediator. Classifications for
    /// unregistered modules are dropped. Returns whether the dashboard was
    /// republished.
    pub fn module_changed(&mut self, classification: ModuleClassification) -> bool {
        let option = classification.option;
        let Some(mediator) = self.mediators.get_mut(&option) else {
            debug!(%option, "dropping classification for unregistered module");
            return false;
        };
        if !mediator.update(classification) {
            return false;
        }
        self.recompute()
    }

    pub fn set_loading(&mut self, option: ModuleOption, loading: bool) -> bool {
        let changed = if loading {
            self.loading.insert(option)
        } else {
            self.loading.remove(&option)
        };
        changed && self.recompute()
    }

    pub fn view_model(&self) -> &DashboardViewModel {
        &self.view
    }

    /// Registers an observer and replays the current view model to it.
    pub fn add_observer(&mut self, observer: Observer<DashboardViewModel>) -> ObserverId {
        self.observers.add_with_replay(observer, Some(&self.view))
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    /// Rebuilds the view model. Observers are notified only when it differs
    /// from the previous one.
    pub fn recompute(&mut self) -> bool {
        let classified: Vec<&ModuleClassification> = self
            .mediators
            .values()
            .filter_map(ModuleMediator::classification)
            .collect();
        let unmanaged_warning =
            has_unmanaged_warning(classified.iter().map(|c| (c.severity, c.is_managed)));
        let browser_safe = !self.mediators.is_empty()
            && classified.len() == self.mediators.len()
            && classified
                .iter()
                .all(|c| matches!(c.severity, Severity::Safe | Severity::Info));

        let mut entries: Vec<DashboardEntry> = self
            .mediators
            .values()
            .filter_map(|mediator| {
                let classification = mediator.classification()?.clone();
                let record = mediator.record()?;
                let option = mediator.option();
                Some(DashboardEntry {
                    option,
                    order: order_key(option, classification.severity, classification.is_managed),
                    expanded: is_expanded(
                        classification.severity,
                        classification.is_managed,
                        unmanaged_warning,
                    ),
                    loading: self.loading.contains(&option),
                    classification,
                    record,
                })
            })
            .collect();
        entries.sort_by_key(|entry| entry.order);

        let view = DashboardViewModel {
            entries,
            has_unmanaged_warning: unmanaged_warning,
            browser_safe,
            loading: self.loading.iter().copied().collect(),
        };
        if view == self.view {
            return false;
        }
        debug!(
            modules = view.entries.len(),
            has_unmanaged_warning = view.has_unmanaged_warning,
            browser_safe = view.browser_safe,
            "dashboard recomputed"
        );
        self.view = view;
        self.observers.notify(&self.view);
        true
    }
}
