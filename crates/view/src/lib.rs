//! The "My Checklists" composition root and the stateful pieces it owns:
//! the persisted visibility scope, the realtime reconciler and the data
//! source it refreshes from.

pub mod error;
pub mod profile;
pub mod reconciler;
pub mod source;
pub mod view;
pub mod visibility;

pub use error::{Result, ViewError};
pub use reconciler::{
    CreationOutcome, DEFAULT_RECENT_EVENT_WINDOW, Notifier, RealtimeReconciler, ReconcilerState,
    Toast,
};
pub use source::ChecklistSource;
pub use view::{ChecklistGroupingView, FeedMessage, RefreshOutcome, RefreshTicket, ViewConfig, ViewOutput};
pub use visibility::{ScopeBus, ScopeChange, Subscription, VisibilityScope};
