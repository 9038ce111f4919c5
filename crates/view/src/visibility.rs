//! Persisted "show all positions" preference shared between views.
//!
//! Writes go to durable storage, then to local listeners synchronously, then
//! onto the [`ScopeBus`] so other views in the same process pick the change
//! up. The scope itself never checks permissions.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use opchecklist_local_store::{KeyValueStore, StoreError, VISIBILITY_KEY, write_json};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_SCOPE_BUS_CAPACITY: usize = 16;

/// Broadcast when any view changes the visibility scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeChange {
    pub show_all: bool,
    /// Identifies the scope that made the change.
    pub origin: Uuid,
}

/// In-process bus carrying [`ScopeChange`]s between views.
#[derive(Debug, Clone)]
pub struct ScopeBus {
    sender: broadcast::Sender<ScopeChange>,
}

impl Default for ScopeBus {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_BUS_CAPACITY)
    }
}

impl ScopeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of receivers the change reached.
    pub fn publish(&self, change: ScopeChange) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScopeChange> {
        self.sender.subscribe()
    }
}

type Listener = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

pub struct VisibilityScope {
    store: Arc<dyn KeyValueStore>,
    bus: Option<ScopeBus>,
    origin: Uuid,
    registry: Arc<Mutex<Registry>>,
}

impl VisibilityScope {
    pub fn new(store: Arc<dyn KeyValueStore>, bus: Option<ScopeBus>) -> Self {
        Self {
            store,
            bus,
            origin: Uuid::new_v4(),
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    pub fn origin(&self) -> Uuid {
        self.origin
    }

    pub fn bus(&self) -> Option<&ScopeBus> {
        self.bus.as_ref()
    }

    /// Current preference. Missing or corrupt values read as `false`.
    pub fn get(&self) -> bool {
        let raw = match self.store.get(VISIBILITY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                warn!("failed to read visibility preference: {e}");
                return false;
            }
        };
        match serde_json::from_str::<bool>(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                warn!("ignoring malformed visibility preference {raw:?}: {e}");
                false
            }
        }
    }

    pub fn set(&self, show_all: bool) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), VISIBILITY_KEY, &show_all)?;
        self.notify(show_all);
        if let Some(bus) = &self.bus {
            let reached = bus.publish(ScopeChange {
                show_all,
                origin: self.origin,
            });
            debug!("published scope change show_all={show_all} to {reached} receivers");
        }
        Ok(())
    }

    /// Register a listener called with the new value on every change.
    pub fn subscribe(&self, listener: impl Fn(bool) + Send + Sync + 'static) -> Subscription {
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    /// Deliver a change made by another view to local listeners.
    ///
    /// Returns `false` for changes this scope published itself.
    pub fn apply_remote(&self, change: ScopeChange) -> bool {
        if change.origin == self.origin {
            return false;
        }
        self.notify(change.show_all);
        true
    }

    pub fn listener_count(&self) -> usize {
        self.registry().listeners.len()
    }

    fn notify(&self, show_all: bool) {
        // Snapshot so listeners may subscribe or unsubscribe re-entrantly.
        let listeners: Vec<Listener> = self
            .registry()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(show_all);
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .expect("visibility listener registry mutex poisoned")
    }
}

/// Handle returned by [`VisibilityScope::subscribe`]. Dropping it removes the
/// listener.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Ok(mut registry) = registry.lock() {
            registry.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
