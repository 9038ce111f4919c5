use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One checklist instance as seen by the list view.
///
/// Values are never mutated in place: a changed checklist arrives as a new
/// summary that replaces the old one by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSummary {
    pub id: String,
    pub name: String,
    pub event_id: String,
    /// `None` marks an incident-level checklist.
    #[serde(default)]
    pub operational_period_id: Option<String>,
    #[serde(default)]
    pub operational_period_name: Option<String>,
    /// 0–100 inclusive.
    pub progress_percentage: f64,
    #[serde(default)]
    pub completed_items: u32,
    #[serde(default)]
    pub total_items: u32,
    /// Comma-joined position labels, possibly empty.
    #[serde(default)]
    pub assigned_positions: String,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
}

/// Completion bucket derived from `progress_percentage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStatus {
    NotStarted,
    InProgress,
    Complete,
}

impl CompletionStatus {
    /// NaN counts as not started.
    pub fn from_progress(progress: f64) -> Self {
        if progress.is_nan() || progress <= 0.0 {
            Self::NotStarted
        } else if progress >= 100.0 {
            Self::Complete
        } else {
            Self::InProgress
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Complete => "complete",
        }
    }
}

impl ChecklistSummary {
    pub fn is_incident_level(&self) -> bool {
        self.operational_period_id.is_none()
    }

    pub fn completion_status(&self) -> CompletionStatus {
        CompletionStatus::from_progress(self.progress_percentage)
    }

    /// Assigned position labels, trimmed, empty entries dropped.
    pub fn positions(&self) -> Vec<&str> {
        split_positions(&self.assigned_positions).collect()
    }
}

/// Split a comma-joined position list into trimmed, non-empty labels.
pub fn split_positions(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
}

/// Options forwarded to the data-access layer when fetching checklists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub include_archived: bool,
    pub all_positions: bool,
}
