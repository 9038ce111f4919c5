use std::sync::Arc;

use opchecklist_core::filter::{self, CompletionFilter, FilterState, PeriodFilter};
use opchecklist_core::grouping::{self, GroupedChecklists};
use opchecklist_core::{ChecklistSummary, CreationEvent, EventLine, FetchOptions, UserProfile};
use opchecklist_local_store::KeyValueStore;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::error::{Result, ViewError};
use crate::reconciler::{
    CreationOutcome, DEFAULT_RECENT_EVENT_WINDOW, Notifier, RealtimeReconciler, ReconcilerState,
};
use crate::source::ChecklistSource;
use crate::visibility::{ScopeBus, ScopeChange, VisibilityScope};

#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub event_id: String,
    pub current_operational_period_id: Option<String>,
    pub recent_event_window: usize,
}

impl ViewConfig {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            current_operational_period_id: None,
            recent_event_window: DEFAULT_RECENT_EVENT_WINDOW,
        }
    }

    pub fn with_current_period(mut self, period_id: Option<String>) -> Self {
        self.current_operational_period_id = period_id;
        self
    }
}

/// Message delivered by the realtime channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMessage {
    Connected,
    Disconnected,
    Created(CreationEvent),
}

impl FeedMessage {
    pub fn from_event_line(line: EventLine) -> Option<Self> {
        match line {
            EventLine::Created(event) => Some(Self::Created(event)),
            EventLine::Connected => Some(Self::Connected),
            EventLine::Disconnected => Some(Self::Disconnected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutput {
    Grouped(GroupedChecklists),
    /// No checklist carries an operational period.
    Flat(Vec<ChecklistSummary>),
}

/// Issued by [`ChecklistGroupingView::begin_refresh`]; orders concurrent
/// fetches so an older response never overwrites a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

enum Pumped {
    Feed(Option<FeedMessage>),
    Scope(std::result::Result<ScopeChange, broadcast::error::RecvError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { checklists: usize },
    /// A newer refresh already completed; the result was discarded.
    Stale,
}

pub struct ChecklistGroupingView {
    event_id: String,
    current_period_id: Option<String>,
    filters: FilterState,
    profile: UserProfile,
    scope: VisibilityScope,
    scope_changes: Option<broadcast::Receiver<ScopeChange>>,
    reconciler: RealtimeReconciler,
    next_ticket: u64,
    newest_completed: Option<RefreshTicket>,
    last_error: Option<String>,
    needs_refresh: bool,
}

impl ChecklistGroupingView {
    pub fn new(
        config: ViewConfig,
        profile: UserProfile,
        store: Arc<dyn KeyValueStore>,
        bus: Option<ScopeBus>,
    ) -> Self {
        let scope_changes = bus.as_ref().map(ScopeBus::subscribe);
        let reconciler = RealtimeReconciler::new(
            profile.primary_position().map(str::to_string),
            config.recent_event_window,
        );
        let current_period_id = config
            .current_operational_period_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self {
            event_id: config.event_id,
            current_period_id,
            filters: FilterState::default(),
            profile,
            scope: VisibilityScope::new(store, bus),
            scope_changes,
            reconciler,
            next_ticket: 0,
            newest_completed: None,
            last_error: None,
            needs_refresh: true,
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.reconciler = self.reconciler.with_notifier(notifier);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn scope(&self) -> &VisibilityScope {
        &self.scope
    }

    pub fn checklists(&self) -> &[ChecklistSummary] {
        self.reconciler.checklists()
    }

    pub fn state(&self) -> ReconcilerState {
        self.reconciler.state()
    }

    pub fn pending_count(&self) -> usize {
        self.reconciler.pending_count()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The held list no longer matches the archive flag or scope.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Effective scope; always `false` for callers without oversight.
    pub fn show_all(&self) -> bool {
        self.profile.can_view_all_positions() && self.scope.get()
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            include_archived: self.filters.show_archived,
            all_positions: self.show_all(),
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    pub fn render(&self) -> ViewOutput {
        let visible = filter::apply(self.reconciler.checklists(), &self.filters);
        if !grouping::has_operational_periods(self.reconciler.checklists()) {
            return ViewOutput::Flat(visible);
        }
        ViewOutput::Grouped(grouping::group(&visible, self.current_period_id.as_deref()))
    }

    // ── Filters ───────────────────────────────────────────────────────────

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.filters.search_query = query.into();
    }

    pub fn set_period_filter(&mut self, period: PeriodFilter) {
        self.filters.period = period;
    }

    pub fn set_completion_filter(&mut self, completion: CompletionFilter) {
        self.filters.completion = completion;
    }

    pub fn set_show_archived(&mut self, show_archived: bool) {
        if self.filters.show_archived != show_archived {
            self.filters.show_archived = show_archived;
            self.needs_refresh = true;
        }
    }

    pub fn clear_filters(&mut self) {
        let show_archived = self.filters.show_archived;
        self.filters = FilterState {
            show_archived,
            ..FilterState::default()
        };
    }

    // ── Scope ─────────────────────────────────────────────────────────────

    pub fn set_show_all(&mut self, show_all: bool) -> Result<()> {
        if !self.profile.can_view_all_positions() {
            return Err(ViewError::NotPermitted);
        }
        let before = self.show_all();
        self.scope.set(show_all)?;
        if before != show_all {
            self.needs_refresh = true;
        }
        Ok(())
    }

    /// Drain scope changes published by other views. Returns `true` if any
    /// arrived, in which case the held list must be refetched.
    pub fn sync_scope(&mut self) -> bool {
        let Some(rx) = self.scope_changes.as_mut() else {
            return false;
        };
        let mut changed = false;
        loop {
            match rx.try_recv() {
                Ok(change) => {
                    if self.scope.apply_remote(change) {
                        changed = true;
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("missed {skipped} scope changes, refetching");
                    changed = true;
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => break,
            }
        }
        if changed {
            self.needs_refresh = true;
        }
        changed
    }

    // ── Refresh ───────────────────────────────────────────────────────────

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.next_ticket += 1;
        RefreshTicket(self.next_ticket)
    }

    /// Apply a fetch result unless a newer refresh already completed.
    ///
    /// A failed fetch keeps the last-known-good list and records the error.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: anyhow::Result<Vec<ChecklistSummary>>,
    ) -> Result<RefreshOutcome> {
        if self.newest_completed.is_some_and(|newest| ticket < newest) {
            debug!("discarding stale refresh {ticket:?}");
            return Ok(RefreshOutcome::Stale);
        }
        self.newest_completed = Some(ticket);

        match result {
            Ok(checklists) => {
                let count = self.reconciler.replace(checklists);
                self.last_error = None;
                self.needs_refresh = false;
                Ok(RefreshOutcome::Applied { checklists: count })
            }
            Err(e) => {
                let message = format!("{e:#}");
                warn!("checklist refresh failed: {message}");
                self.last_error = Some(message.clone());
                Err(ViewError::Fetch(message))
            }
        }
    }

    pub async fn refresh<S: ChecklistSource>(&mut self, source: &S) -> Result<RefreshOutcome> {
        self.sync_scope();
        let ticket = self.begin_refresh();
        let options = self.fetch_options();
        let result = source.fetch_checklists(&self.event_id, options).await;
        self.complete_refresh(ticket, result)
    }

    // ── Realtime ──────────────────────────────────────────────────────────

    pub fn handle_feed(&mut self, message: FeedMessage) -> Option<CreationOutcome> {
        match message {
            FeedMessage::Connected => {
                self.reconciler.connect();
                None
            }
            FeedMessage::Disconnected => {
                self.reconciler.disconnect();
                None
            }
            FeedMessage::Created(event) => Some(self.reconciler.on_creation(&event)),
        }
    }

    /// Handle feed messages until the sender side closes, applying scope
    /// changes from other views as they arrive. Returns the number of
    /// creations counted.
    pub async fn pump(&mut self, feed: &mut mpsc::Receiver<FeedMessage>) -> usize {
        let mut counted = 0;
        loop {
            let next = match self.scope_changes.as_mut() {
                Some(scope_changes) => tokio::select! {
                    message = feed.recv() => Pumped::Feed(message),
                    change = scope_changes.recv() => Pumped::Scope(change),
                },
                None => Pumped::Feed(feed.recv().await),
            };
            match next {
                Pumped::Feed(Some(message)) => {
                    if let Some(CreationOutcome::Counted(_)) = self.handle_feed(message) {
                        counted += 1;
                    }
                }
                Pumped::Feed(None) => break,
                Pumped::Scope(Ok(change)) => {
                    if self.scope.apply_remote(change) {
                        self.needs_refresh = true;
                    }
                }
                Pumped::Scope(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    warn!("missed {skipped} scope changes, refetching");
                    self.needs_refresh = true;
                }
                Pumped::Scope(Err(broadcast::error::RecvError::Closed)) => {
                    self.scope_changes = None;
                }
            }
        }
        // Changes racing the feed's close are still applied.
        self.sync_scope();
        if self.reconciler.is_connected() {
            self.reconciler.disconnect();
        }
        info!(
            "realtime feed closed, {} pending",
            self.reconciler.pending_count()
        );
        counted
    }
}
