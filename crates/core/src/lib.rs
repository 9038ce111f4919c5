//! Checklist summaries as seen by the "My Checklists" view, the filter
//! pipeline that narrows them and the grouping engine that sections them by
//! operational period.

pub mod checklist;
pub mod events;
pub mod filter;
pub mod grouping;
pub mod profile;

pub use checklist::{ChecklistSummary, CompletionStatus, FetchOptions, split_positions};
pub use events::{CreationEvent, EventLine, EventStreamError};
pub use filter::{CompletionFilter, FilterStage, FilterState, PeriodFilter};
pub use grouping::{GroupedChecklists, Section, SectionKind, group};
pub use profile::{Role, UserProfile};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
