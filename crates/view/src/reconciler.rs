//! Turns realtime creation events into a pending-update badge and replaces
//! the held list wholesale on refresh. Nothing is inserted optimistically.

use std::collections::{HashSet, VecDeque};

use opchecklist_core::{ChecklistSummary, CreationEvent, FetchOptions};
use tracing::{debug, info};

use crate::source::ChecklistSource;

pub const DEFAULT_RECENT_EVENT_WINDOW: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcilerState {
    /// Realtime channel not connected.
    #[default]
    Idle,
    Listening,
    /// At least one visible creation since the last refresh.
    PendingUpdate,
}

/// Notification raised for a visible creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub checklist_id: String,
    pub checklist_name: String,
    pub created_by: String,
}

impl Toast {
    pub fn message(&self) -> String {
        if self.created_by.is_empty() {
            format!("New checklist \"{}\"", self.checklist_name)
        } else {
            format!(
                "New checklist \"{}\" created by {}",
                self.checklist_name, self.created_by
            )
        }
    }
}

pub trait Notifier: Send {
    fn notify(&mut self, toast: &Toast);
}

impl<F: FnMut(&Toast) + Send> Notifier for F {
    fn notify(&mut self, toast: &Toast) {
        self(toast)
    }
}

/// What happened to a delivered creation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    Counted(Toast),
    NotVisible,
    Duplicate,
    /// Delivered while the channel was not connected.
    Dropped,
}

/// Bounded FIFO of recently counted checklist ids.
#[derive(Debug)]
struct RecentEvents {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl RecentEvents {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Returns `false` if `id` is already in the window.
    fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        if self.order.len() == self.capacity
            && let Some(evicted) = self.order.pop_front()
        {
            self.seen.remove(&evicted);
        }
        self.order.push_back(id.to_string());
        self.seen.insert(id.to_string());
        true
    }
}

pub struct RealtimeReconciler {
    state: ReconcilerState,
    connected: bool,
    pending: usize,
    caller_position: Option<String>,
    recent: RecentEvents,
    checklists: Vec<ChecklistSummary>,
    notifier: Option<Box<dyn Notifier>>,
}

impl RealtimeReconciler {
    /// `caller_position` is the caller's primary position; `None` sees only
    /// events addressed to every position.
    pub fn new(caller_position: Option<String>, recent_event_window: usize) -> Self {
        Self {
            state: ReconcilerState::Idle,
            connected: false,
            pending: 0,
            caller_position: caller_position
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            recent: RecentEvents::new(recent_event_window),
            checklists: Vec::new(),
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Box::new(notifier));
        self
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn pending_count(&self) -> usize {
        self.pending
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn caller_position(&self) -> Option<&str> {
        self.caller_position.as_deref()
    }

    pub fn checklists(&self) -> &[ChecklistSummary] {
        &self.checklists
    }

    pub fn connect(&mut self) {
        self.connected = true;
        self.state = if self.pending > 0 {
            ReconcilerState::PendingUpdate
        } else {
            ReconcilerState::Listening
        };
        debug!("realtime channel connected, state={:?}", self.state);
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
        self.state = ReconcilerState::Idle;
        debug!("realtime channel disconnected, {} pending kept", self.pending);
    }

    pub fn on_creation(&mut self, event: &CreationEvent) -> CreationOutcome {
        if self.state == ReconcilerState::Idle {
            debug!("dropping creation {} while idle", event.checklist_id);
            return CreationOutcome::Dropped;
        }
        if !event.is_visible_to(self.caller_position.as_deref()) {
            return CreationOutcome::NotVisible;
        }
        if !self.recent.insert(&event.checklist_id) {
            debug!("ignoring duplicate creation {}", event.checklist_id);
            return CreationOutcome::Duplicate;
        }

        self.pending += 1;
        self.state = ReconcilerState::PendingUpdate;
        let toast = Toast {
            checklist_id: event.checklist_id.clone(),
            checklist_name: event.checklist_name.clone(),
            created_by: event.created_by.clone(),
        };
        if let Some(notifier) = self.notifier.as_mut() {
            notifier.notify(&toast);
        }
        CreationOutcome::Counted(toast)
    }

    /// Fetch the authoritative list and replace the held collection.
    ///
    /// On failure the held list, the pending count and the state are left
    /// untouched.
    pub async fn refresh<S: ChecklistSource>(
        &mut self,
        source: &S,
        event_id: &str,
        options: FetchOptions,
    ) -> anyhow::Result<usize> {
        let checklists = source.fetch_checklists(event_id, options).await?;
        Ok(self.replace(checklists))
    }

    /// Install an authoritative snapshot fetched elsewhere.
    pub fn replace(&mut self, checklists: Vec<ChecklistSummary>) -> usize {
        let cleared = self.pending;
        self.checklists = checklists;
        self.pending = 0;
        self.state = if self.connected {
            ReconcilerState::Listening
        } else {
            ReconcilerState::Idle
        };
        info!(
            "refreshed {} checklists, cleared {cleared} pending",
            self.checklists.len()
        );
        self.checklists.len()
    }
}
