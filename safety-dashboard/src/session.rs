//! The dashboard session: single owner of every source, the password
//! reducer, the loading timers and the reconciler.
//!
//! Fetches and timers run as spawned tasks and report back over channels.
//! The owner pulls events with [`DashboardSession::next_event`] and applies
//! them one at a time with [`DashboardSession::handle_event`], so no state is
//! ever shared across tasks.
//!
//! Each registered module is subscribed to its source (or the reducer, for
//! the unified module). Observers queue classifications, and the session
//! hands them to the reconciler once the triggering call has finished.

use std::collections::BTreeMap;
use std::sync::Arc;

use safety_model::ActionRequest;
use safety_model::ButtonSlot;
use safety_model::CounterStore;
use safety_model::ModuleClassification;
use safety_model::ModuleOption;
use safety_model::Observer;
use safety_model::ObserverId;
use safety_passwords::PasswordSide;
use safety_passwords::UnifiedPasswordReducer;
use safety_sources::CheckerError;
use safety_sources::Counts;
use safety_sources::DataSource;
use safety_sources::FetchOutcome;
use safety_sources::ModuleSource;
use safety_sources::NotificationReviewState;
use safety_sources::PasswordSourceState;
use safety_sources::SafeBrowsingState;
use safety_sources::SecurityChecker;
use safety_sources::SourceContext;
use safety_sources::SourceEvent;
use safety_sources::UnusedPermissionsState;
use safety_sources::UpdateCheckState;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::HubConfig;
use crate::error::Result;
use crate::reconciler::DashboardReconciler;
use crate::timer::LoadingTimers;
use crate::timer::TimerFired;
use crate::view_model::DashboardViewModel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Source(SourceEvent),
    Timer(TimerFired),
}

/// Request ids issued by the running password check, per side.
#[derive(Debug, Default)]
struct CheckRequests {
    account: Option<u64>,
    local: Option<u64>,
}

pub struct DashboardSession {
    config: HubConfig,
    source_rx: mpsc::UnboundedReceiver<SourceEvent>,
    timer_rx: mpsc::UnboundedReceiver<TimerFired>,
    account: DataSource<PasswordSourceState>,
    local: DataSource<PasswordSourceState>,
    sources: BTreeMap<ModuleOption, Box<dyn ModuleSource>>,
    reducer: Option<UnifiedPasswordReducer>,
    check_requests: CheckRequests,
    timers: LoadingTimers,
    reconciler: DashboardReconciler,
    classified_rx: mpsc::UnboundedReceiver<ModuleClassification>,
    started: bool,
    closed: bool,
}

/// Observer queueing every classification it sees.
fn forward_to(tx: &mpsc::UnboundedSender<ModuleClassification>) -> Observer<ModuleClassification> {
    let tx = tx.clone();
    Box::new(move |classification: &ModuleClassification| {
        if tx.send(classification.clone()).is_err() {
            debug!(option = %classification.option, "session gone, dropping classification");
        }
    })
}

impl DashboardSession {
    /// Builds every source and registers the modules enabled by `config`.
    /// Nothing is fetched until [`start`](Self::start).
    pub fn new(
        config: HubConfig,
        checker: Arc<dyn SecurityChecker>,
        store: Arc<dyn CounterStore>,
    ) -> Result<Self> {
        config.validate()?;
        let (ctx, source_rx) = SourceContext::new(checker, store);
        let (timers, timer_rx) =
            LoadingTimers::new(config.loading.min_display(), config.loading.max_wait());
        let features = &config.features;

        let mut account = DataSource::new(
            PasswordSourceState::account(features.weak_and_reused_passwords),
            ctx.clone(),
        );
        let mut local = DataSource::new(
            PasswordSourceState::local(features.weak_and_reused_passwords),
            ctx.clone(),
        );

        let mut sources: BTreeMap<ModuleOption, Box<dyn ModuleSource>> = BTreeMap::new();
        sources.insert(
            ModuleOption::UpdateCheck,
            Box::new(DataSource::new(UpdateCheckState::new(), ctx.clone())),
        );
        sources.insert(
            ModuleOption::SafeBrowsing,
            Box::new(DataSource::new(SafeBrowsingState::new(), ctx.clone())),
        );
        sources.insert(
            ModuleOption::UnusedPermissions,
            Box::new(DataSource::new(UnusedPermissionsState::new(), ctx.clone())),
        );
        sources.insert(
            ModuleOption::NotificationReview,
            Box::new(DataSource::new(NotificationReviewState::new(), ctx)),
        );

        let mut reconciler = DashboardReconciler::new();
        for option in sources.keys() {
            reconciler.register(*option);
        }
        let mut reducer = if features.unified_passwords_module {
            reconciler.register(ModuleOption::UnifiedPasswords);
            Some(UnifiedPasswordReducer::new(features.weak_and_reused_passwords))
        } else {
            reconciler.register(ModuleOption::AccountPasswords);
            if features.local_passwords_module {
                reconciler.register(ModuleOption::LocalPasswords);
            }
            None
        };

        let (classified_tx, classified_rx) = mpsc::unbounded_channel();
        for source in sources.values_mut() {
            source.add_observer(forward_to(&classified_tx));
        }
        if reconciler.is_registered(ModuleOption::AccountPasswords) {
            account.add_observer(forward_to(&classified_tx));
        }
        if reconciler.is_registered(ModuleOption::LocalPasswords) {
            local.add_observer(forward_to(&classified_tx));
        }
        if let Some(reducer) = reducer.as_mut() {
            reducer.add_observer(forward_to(&classified_tx));
        }

        Ok(Self {
            config,
            source_rx,
            timer_rx,
            account,
            local,
            sources,
            reducer,
            check_requests: CheckRequests::default(),
            timers,
            reconciler,
            classified_rx,
            started: false,
            closed: false,
        })
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Restores persisted counters and issues the first fetches. Must run
    /// inside a tokio runtime. Calling it twice is a no-op.
    pub fn start(&mut self) {
        if self.started || self.closed {
            return;
        }
        self.started = true;
        info!(
            modules = self.reconciler.registered().count(),
            unified_passwords = self.reducer.is_some(),
            "starting safety hub session"
        );

        for source in self.sources.values_mut() {
            source.start();
        }
        if self.config.checkup.run_on_open {
            let account_id = self.account.start_with_checkup();
            let local_id = self.local.start_with_checkup();
            self.begin_password_check(account_id, local_id);
        } else {
            self.account.start();
            self.local.start();
        }
        // Classifications restored from persisted counters.
        self.deliver_classifications();
    }

    /// Refetches one module. Refreshing the unified module refetches both
    /// password stores. Returns `false` for a module this session does not
    /// own.
    pub fn refresh(&mut self, option: ModuleOption) -> bool {
        if self.closed {
            return false;
        }
        match option {
            ModuleOption::AccountPasswords => {
                self.account.refresh();
            }
            ModuleOption::LocalPasswords => {
                self.local.refresh();
            }
            ModuleOption::UnifiedPasswords => {
                self.account.refresh();
                self.local.refresh();
            }
            other => match self.sources.get_mut(&other) {
                Some(source) => {
                    source.refresh();
                }
                None => return false,
            },
        }
        true
    }

    pub fn refresh_all(&mut self) {
        if self.closed {
            return;
        }
        for source in self.sources.values_mut() {
            source.refresh();
        }
        self.account.refresh();
        self.local.refresh();
    }

    /// Runs a checkup on both password stores. With the unified module the
    /// loading indicator is shown until both results are in.
    pub fn run_password_checkup(&mut self) {
        if self.closed {
            return;
        }
        let account_id = self.account.run_checkup();
        let local_id = self.local.run_checkup();
        self.begin_password_check(account_id, local_id);
    }

    /// Sign-in prerequisite for the account password store.
    pub fn set_signed_in(&mut self, signed_in: bool) {
        if self.closed {
            return;
        }
        debug!(signed_in, "sign-in state changed");
        self.account.update_state(|state| state.set_signed_in(signed_in));
        // The reducer only hears from a side once it has reported.
        if self.account.current_classification().is_some() {
            if let Some(reducer) = self.reducer.as_mut() {
                reducer.on_account_update(self.account.state().snapshot(), false);
            }
        }
        self.sync_unified();
        self.deliver_classifications();
        if signed_in {
            self.account.refresh();
        }
    }

    /// Waits for the next fetch completion or timer expiry.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if self.closed {
            return None;
        }
        tokio::select! {
            Some(event) = self.source_rx.recv() => Some(SessionEvent::Source(event)),
            Some(fired) = self.timer_rx.recv() => Some(SessionEvent::Timer(fired)),
            else => None,
        }
    }

    /// Non-blocking variant of [`next_event`](Self::next_event).
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        if self.closed {
            return None;
        }
        if let Ok(event) = self.source_rx.try_recv() {
            return Some(SessionEvent::Source(event));
        }
        self.timer_rx.try_recv().ok().map(SessionEvent::Timer)
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        if self.closed {
            debug!(?event, "session closed, dropping event");
            return;
        }
        match event {
            SessionEvent::Source(SourceEvent::Fetched {
                option,
                request_id,
                result,
            }) => self.on_fetched(option, request_id, result),
            SessionEvent::Timer(fired) => {
                if let Some(reducer) = self.reducer.as_mut() {
                    reducer.on_timer(fired.timer, fired.generation);
                }
                self.sync_unified();
            }
        }
        self.deliver_classifications();
    }

    /// Waits for and applies one event. Returns `false` once no more events
    /// can arrive.
    pub async fn process_next(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// No fetch outstanding and no loading indicator showing.
    pub fn is_settled(&self) -> bool {
        let fetching = self.account.is_fetching()
            || self.local.is_fetching()
            || self.sources.values().any(|source| source.is_fetching());
        let loading = self.reducer.as_ref().is_some_and(UnifiedPasswordReducer::is_loading);
        !(fetching || loading)
    }

    pub async fn run_until_settled(&mut self) {
        while !self.closed && !self.is_settled() {
            if !self.process_next().await {
                break;
            }
        }
    }

    pub fn view_model(&self) -> &DashboardViewModel {
        self.reconciler.view_model()
    }

    /// Registers a view-model observer; the current view model is replayed
    /// to it immediately.
    pub fn add_observer(&mut self, observer: Observer<DashboardViewModel>) -> ObserverId {
        self.reconciler.add_observer(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.reconciler.remove_observer(id)
    }

    /// Resolves a button press into the request the caller should perform.
    pub fn press(&self, option: ModuleOption, slot: ButtonSlot) -> Option<ActionRequest> {
        if self.closed {
            return None;
        }
        let request = self.reconciler.mediator(option)?.action_request(slot)?;
        info!(%option, ?slot, action = ?request.action, "module action requested");
        Some(request)
    }

    /// Tears everything down. In-flight fetches are cancelled and any event
    /// still queued is ignored.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        info!("closing safety hub session");
        self.account.destroy();
        self.local.destroy();
        for source in self.sources.values_mut() {
            source.destroy();
        }
        if let Some(reducer) = self.reducer.as_mut() {
            reducer.destroy();
        }
        self.timers.cancel();
        self.reconciler.clear_observers();
    }

    fn begin_password_check(&mut self, account_id: u64, local_id: u64) {
        let Some(reducer) = self.reducer.as_mut() else {
            return;
        };
        let generation = reducer.begin_check();
        self.timers.arm(generation);
        self.check_requests = CheckRequests {
            account: Some(account_id),
            local: Some(local_id),
        };
        self.reconciler.set_loading(ModuleOption::UnifiedPasswords, true);
    }

    fn on_fetched(
        &mut self,
        option: ModuleOption,
        request_id: u64,
        result: std::result::Result<Counts, CheckerError>,
    ) {
        let side = match option {
            ModuleOption::AccountPasswords => PasswordSide::Account,
            ModuleOption::LocalPasswords => PasswordSide::Local,
            other => {
                let Some(source) = self.sources.get_mut(&other) else {
                    warn!(option = %other, "fetch result for unknown module");
                    return;
                };
                source.on_fetch_completed(request_id, result);
                return;
            }
        };

        let (source, pending) = match side {
            PasswordSide::Account => (&mut self.account, &mut self.check_requests.account),
            PasswordSide::Local => (&mut self.local, &mut self.check_requests.local),
        };
        if source.on_fetch_completed(request_id, result) == FetchOutcome::Ignored {
            return;
        }

        let completes_check = pending.is_some_and(|id| request_id >= id);
        if completes_check {
            *pending = None;
        }
        let snapshot = source.state().snapshot();
        if let Some(reducer) = self.reducer.as_mut() {
            reducer.on_update(side, snapshot, completes_check);
        }
        self.sync_unified();
    }

    /// Pushes the reducer's loading state to the reconciler, after any
    /// classification it published.
    fn sync_unified(&mut self) {
        let Some(loading) = self.reducer.as_ref().map(UnifiedPasswordReducer::is_loading) else {
            return;
        };
        self.deliver_classifications();
        self.reconciler.set_loading(ModuleOption::UnifiedPasswords, loading);
        if !loading {
            self.timers.cancel();
        }
    }

    /// Hands queued classifications to the reconciler in publication order.
    fn deliver_classifications(&mut self) {
        while let Ok(classification) = self.classified_rx.try_recv() {
            self.reconciler.module_changed(classification);
        }
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for DashboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardSession")
            .field("config", &self.config)
            .field("registered", &self.reconciler.registered().collect::<Vec<_>>())
            .field("started", &self.started)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
