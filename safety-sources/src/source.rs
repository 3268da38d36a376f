//! Generic asynchronous data source.
//!
//! A `DataSource` owns one domain state, issues fetches as spawned tasks and
//! applies their results on the owner task. Results travel back over an
//! unbounded channel as [`SourceEvent`]s; the owner routes each event to the
//! source that issued it via [`DataSource::on_fetch_completed`].

use std::sync::Arc;

use safety_model::CounterStore;
use safety_model::ModuleClassification;
use safety_model::ModuleOption;
use safety_model::Observer;
use safety_model::ObserverId;
use safety_model::ObserverList;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::checker::CheckDomain;
use crate::checker::Counts;
use crate::checker::SecurityChecker;
use crate::error::CheckerError;

/// Per-domain state and decision ladder.
pub trait ModuleState: Send + 'static {
    fn option(&self) -> ModuleOption;

    fn domain(&self) -> CheckDomain;

    /// Primes the state from persisted counters. Missing counters and the
    /// sentinel leave their field pending.
    fn restore(&mut self, store: &dyn CounterStore);

    /// Applies a successful fetch. Counts for another domain are rejected.
    fn apply(&mut self, counts: Counts) -> Result<(), CheckerError>;

    /// Marks every fetched field unavailable after a failed fetch.
    fn invalidate(&mut self);

    fn persist(&self, store: &dyn CounterStore);

    /// Runs the decision ladder. `None` while not ready.
    fn classify(&self) -> Option<ModuleClassification>;
}

/// Completion of a spawned fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Fetched {
        option: ModuleOption,
        request_id: u64,
        result: Result<Counts, CheckerError>,
    },
}

impl SourceEvent {
    pub fn option(&self) -> ModuleOption {
        match self {
            SourceEvent::Fetched { option, .. } => *option,
        }
    }
}

/// Collaborators shared by every source of a session.
#[derive(Clone)]
pub struct SourceContext {
    pub checker: Arc<dyn SecurityChecker>,
    pub store: Arc<dyn CounterStore>,
    pub events: mpsc::UnboundedSender<SourceEvent>,
}

impl SourceContext {
    pub fn new(
        checker: Arc<dyn SecurityChecker>,
        store: Arc<dyn CounterStore>,
    ) -> (Self, mpsc::UnboundedReceiver<SourceEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                checker,
                store,
                events,
            },
            rx,
        )
    }
}

impl std::fmt::Debug for SourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceContext").finish_non_exhaustive()
    }
}

/// What applying a fetch result did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Stale request, or the source was destroyed.
    Ignored,
    /// Applied, classification unchanged.
    Unchanged,
    /// Applied, classification replaced.
    Changed,
}

pub struct DataSource<S: ModuleState> {
    state: S,
    ctx: SourceContext,
    classification: Option<ModuleClassification>,
    observers: ObserverList<ModuleClassification>,
    cancel: CancellationToken,
    latest_request: u64,
    last_applied: u64,
    destroyed: bool,
}

impl<S: ModuleState> DataSource<S> {
    pub fn new(state: S, ctx: SourceContext) -> Self {
        Self {
            state,
            ctx,
            classification: None,
            observers: ObserverList::new(),
            cancel: CancellationToken::new(),
            latest_request: 0,
            last_applied: 0,
            destroyed: false,
        }
    }

    pub fn option(&self) -> ModuleOption {
        self.state.option()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Restores persisted counters, classifies, then issues a fetch.
    pub fn start(&mut self) -> u64 {
        self.restore();
        self.refresh()
    }

    /// Like [`start`](Self::start) but asks the provider to recompute first.
    pub fn start_with_checkup(&mut self) -> u64 {
        self.restore();
        self.run_checkup()
    }

    pub fn refresh(&mut self) -> u64 {
        self.issue(false)
    }

    /// Runs a checkup followed by a fetch. The fetch is issued even when the
    /// checkup fails or is skipped by the provider.
    pub fn run_checkup(&mut self) -> u64 {
        self.issue(true)
    }

    pub fn on_fetch_completed(
        &mut self,
        request_id: u64,
        result: Result<Counts, CheckerError>,
    ) -> FetchOutcome {
        let option = self.state.option();
        if self.destroyed || request_id <= self.last_applied || request_id > self.latest_request {
            debug!(%option, request_id, last_applied = self.last_applied, "ignoring fetch result");
            return FetchOutcome::Ignored;
        }
        self.last_applied = request_id;

        match result {
            Ok(counts) => {
                if let Err(err) = self.state.apply(counts) {
                    warn!(%option, error = %err, "discarding unexpected counts");
                    self.state.invalidate();
                }
            }
            Err(err) => {
                warn!(%option, error = %err, "fetch failed");
                self.state.invalidate();
            }
        }
        self.state.persist(self.ctx.store.as_ref());

        if self.reclassify() {
            FetchOutcome::Changed
        } else {
            FetchOutcome::Unchanged
        }
    }

    /// Applies a prerequisite signal and re-runs the ladder. Returns whether
    /// the classification changed.
    pub fn update_state<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut S),
    {
        if self.destroyed {
            return false;
        }
        f(&mut self.state);
        self.reclassify()
    }

    pub fn current_classification(&self) -> Option<&ModuleClassification> {
        self.classification.as_ref()
    }

    /// Whether the most recently issued request is still outstanding.
    pub fn is_fetching(&self) -> bool {
        !self.destroyed && self.latest_request > self.last_applied
    }

    /// Registers an observer and replays the current classification to it.
    pub fn add_observer(&mut self, observer: Observer<ModuleClassification>) -> ObserverId {
        self.observers.add_with_replay(observer, self.classification.as_ref())
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Drops observers and cancels in-flight fetches. Later completions are
    /// ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        debug!(option = %self.state.option(), "destroying data source");
        self.destroyed = true;
        self.observers.clear();
        self.cancel.cancel();
    }

    fn restore(&mut self) {
        self.state.restore(self.ctx.store.as_ref());
        self.reclassify();
    }

    fn reclassify(&mut self) -> bool {
        let next = self.state.classify();
        if next == self.classification {
            return false;
        }
        self.classification = next;
        if let Some(classification) = &self.classification {
            self.observers.notify(classification);
        }
        true
    }

    fn issue(&mut self, with_checkup: bool) -> u64 {
        if self.destroyed {
            return self.latest_request;
        }
        self.latest_request += 1;
        let request_id = self.latest_request;
        let option = self.state.option();
        let domain = self.state.domain();
        let checker = Arc::clone(&self.ctx.checker);
        let events = self.ctx.events.clone();
        let token = self.cancel.child_token();
        debug!(%option, request_id, with_checkup, "issuing fetch");

        tokio::spawn(async move {
            let work = async {
                if with_checkup {
                    if let Err(err) = checker.run_checkup(domain).await {
                        warn!(%domain, error = %err, "checkup failed, fetching last known counts");
                    }
                }
                checker.fetch_counts(domain).await
            };
            let result = tokio::select! {
                _ = token.cancelled() => {
                    debug!(%domain, request_id, "fetch cancelled");
                    return;
                }
                result = work => result,
            };
            if events
                .send(SourceEvent::Fetched {
                    option,
                    request_id,
                    result,
                })
                .is_err()
            {
                debug!(%domain, request_id, "fetch completed after the owner went away");
            }
        });
        request_id
    }
}

impl<S: ModuleState> Drop for DataSource<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<S: ModuleState> std::fmt::Debug for DataSource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("option", &self.state.option())
            .field("classification", &self.classification)
            .field("latest_request", &self.latest_request)
            .field("last_applied", &self.last_applied)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

/// Object-safe view of a [`DataSource`], for owners holding sources of
/// different domains side by side.
pub trait ModuleSource: Send {
    fn option(&self) -> ModuleOption;
    fn start(&mut self) -> u64;
    fn start_with_checkup(&mut self) -> u64;
    fn refresh(&mut self) -> u64;
    fn run_checkup(&mut self) -> u64;
    fn on_fetch_completed(
        &mut self,
        request_id: u64,
        result: Result<Counts, CheckerError>,
    ) -> FetchOutcome;
    fn current_classification(&self) -> Option<&ModuleClassification>;
    fn is_fetching(&self) -> bool;
    fn add_observer(&mut self, observer: Observer<ModuleClassification>) -> ObserverId;
    fn remove_observer(&mut self, id: ObserverId) -> bool;
    fn destroy(&mut self);
}

impl<S: ModuleState> ModuleSource for DataSource<S> {
    fn option(&self) -> ModuleOption {
        DataSource::option(self)
    }

    fn start(&mut self) -> u64 {
        DataSource::start(self)
    }

    fn start_with_checkup(&mut self) -> u64 {
        DataSource::start_with_checkup(self)
    }

    fn refresh(&mut self) -> u64 {
        DataSource::refresh(self)
    }

    fn run_checkup(&mut self) -> u64 {
        DataSource::run_checkup(self)
    }

    fn on_fetch_completed(
        &mut self,
        request_id: u64,
        result: Result<Counts, CheckerError>,
    ) -> FetchOutcome {
        DataSource::on_fetch_completed(self, request_id, result)
    }

    fn current_classification(&self) -> Option<&ModuleClassification> {
        DataSource::current_classification(self)
    }

    fn is_fetching(&self) -> bool {
        DataSource::is_fetching(self)
    }

    fn add_observer(&mut self, observer: Observer<ModuleClassification>) -> ObserverId {
        DataSource::add_observer(self, observer)
    }

    fn remove_observer(&mut self, id: ObserverId) -> bool {
        DataSource::remove_observer(self, id)
    }

    fn destroy(&mut self) {
        DataSource::destroy(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::UnusedPermissionsState;
    use crate::static_checker::StaticChecker;
    use safety_model::MemoryCounterStore;
    use safety_model::Severity;
    use safety_model::UNAVAILABLE_COUNT;
    use safety_model::counter_key;
    use std::sync::Mutex;
    use std::time::Duration;

    fn permissions_source(
        checker: StaticChecker,
        store: Arc<MemoryCounterStore>,
    ) -> (
        DataSource<UnusedPermissionsState>,
        mpsc::UnboundedReceiver<SourceEvent>,
    ) {
        let (ctx, rx) = SourceContext::new(Arc::new(checker), store);
        (DataSource::new(UnusedPermissionsState::new(), ctx), rx)
    }

    fn apply_next(
        source: &mut DataSource<UnusedPermissionsState>,
        event: SourceEvent,
    ) -> FetchOutcome {
        let SourceEvent::Fetched {
            request_id, result, ..
        } = event;
        source.on_fetch_completed(request_id, result)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_restores_then_fetches() {
        let checker = StaticChecker::new();
        checker.set_response(
            CheckDomain::UnusedPermissions,
            Ok(Counts::UnusedPermissions { sites: 0 }),
        );
        let store = Arc::new(MemoryCounterStore::with_values([(
            counter_key(ModuleOption::UnusedPermissions, "sites"),
            2,
        )]));
        let (mut source, mut rx) = permissions_source(checker, Arc::clone(&store));

        source.start();
        let restored = source.current_classification().unwrap();
        assert_eq!(restored.severity, Severity::Info);
        assert!(source.is_fetching());

        let event = rx.recv().await.unwrap();
        assert_eq!(apply_next(&mut source, event), FetchOutcome::Changed);
        assert_eq!(
            source.current_classification().unwrap().severity,
            Severity::Safe
        );
        assert!(!source.is_fetching());
        assert_eq!(
            store.get_int(&counter_key(ModuleOption::UnusedPermissions, "sites")),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unready_until_first_fetch() {
        let checker = StaticChecker::new();
        checker.set_response(
            CheckDomain::UnusedPermissions,
            Ok(Counts::UnusedPermissions { sites: 1 }),
        );
        let (mut source, mut rx) = permissions_source(checker, Arc::new(MemoryCounterStore::new()));

        source.start();
        assert!(source.current_classification().is_none());
        let event = rx.recv().await.unwrap();
        apply_next(&mut source, event);
        assert_eq!(
            source.current_classification().unwrap().severity,
            Severity::Info
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_persists_sentinel() {
        let checker = StaticChecker::new();
        checker.set_response(
            CheckDomain::UnusedPermissions,
            Err(CheckerError::Unreachable("offline".to_string())),
        );
        let store = Arc::new(MemoryCounterStore::with_values([(
            counter_key(ModuleOption::UnusedPermissions, "sites"),
            4,
        )]));
        let (mut source, mut rx) = permissions_source(checker, Arc::clone(&store));

        source.start();
        let event = rx.recv().await.unwrap();
        assert_eq!(apply_next(&mut source, event), FetchOutcome::Changed);
        assert_eq!(
            source.current_classification().unwrap().severity,
            Severity::Unavailable
        );
        assert_eq!(
            store.get_int(&counter_key(ModuleOption::UnusedPermissions, "sites")),
            UNAVAILABLE_COUNT
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_result_after_newer_is_ignored() {
        let checker = StaticChecker::new();
        let (mut source, _rx) = permissions_source(checker, Arc::new(MemoryCounterStore::new()));

        let first = source.refresh();
        let second = source.refresh();
        assert!(second > first);

        let newer = source.on_fetch_completed(second, Ok(Counts::UnusedPermissions { sites: 0 }));
        assert_eq!(newer, FetchOutcome::Changed);
        let older = source.on_fetch_completed(first, Ok(Counts::UnusedPermissions { sites: 5 }));
        assert_eq!(older, FetchOutcome::Ignored);
        assert_eq!(
            source.current_classification().unwrap().severity,
            Severity::Safe
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_result_does_not_notify() {
        let checker = StaticChecker::new();
        let (mut source, _rx) = permissions_source(checker, Arc::new(MemoryCounterStore::new()));
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        source.add_observer(Box::new(move |_| *counter.lock().unwrap() += 1));

        let id = source.refresh();
        source.on_fetch_completed(id, Ok(Counts::UnusedPermissions { sites: 3 }));
        let id = source.refresh();
        let outcome = source.on_fetch_completed(id, Ok(Counts::UnusedPermissions { sites: 3 }));

        assert_eq!(outcome, FetchOutcome::Unchanged);
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_replay_and_removal() {
        let checker = StaticChecker::new();
        let (mut source, _rx) = permissions_source(checker, Arc::new(MemoryCounterStore::new()));
        let id = source.refresh();
        source.on_fetch_completed(id, Ok(Counts::UnusedPermissions { sites: 0 }));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer = source.add_observer(Box::new(move |c: &ModuleClassification| {
            sink.lock().unwrap().push(c.severity)
        }));
        assert_eq!(*seen.lock().unwrap(), vec![Severity::Safe]);

        assert!(source.remove_observer(observer));
        assert!(!source.remove_observer(observer));
        let id = source.refresh();
        source.on_fetch_completed(id, Ok(Counts::UnusedPermissions { sites: 2 }));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_with_fetch_in_flight() {
        let checker = StaticChecker::new();
        checker.set_response(
            CheckDomain::UnusedPermissions,
            Ok(Counts::UnusedPermissions { sites: 1 }),
        );
        checker.set_delay(CheckDomain::UnusedPermissions, Duration::from_secs(2));
        let (mut source, mut rx) = permissions_source(checker, Arc::new(MemoryCounterStore::new()));

        let id = source.start();
        tokio::task::yield_now().await;
        source.destroy();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(rx.try_recv().is_err());
        let late = source.on_fetch_completed(id, Ok(Counts::UnusedPermissions { sites: 1 }));
        assert_eq!(late, FetchOutcome::Ignored);
        assert!(source.current_classification().is_none());
        assert!(!source.is_fetching());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_domain_counts_invalidate() {
        let checker = StaticChecker::new();
        let (mut source, _rx) = permissions_source(checker, Arc::new(MemoryCounterStore::new()));
        let id = source.refresh();
        source.on_fetch_completed(id, Ok(Counts::NotificationReview { sites: 3 }));
        assert_eq!(source.current_classification().unwrap().severity, Severity::Unavailable);
    }
}
