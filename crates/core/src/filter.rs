//! Pure filter pipeline applied to the checklist collection before grouping.
//!
//! Each stage is a subset filter, so stage order changes cost, never the
//! resulting set. Input order is preserved.

use crate::checklist::{ChecklistSummary, CompletionStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operational-period selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum PeriodFilter {
    #[default]
    Any,
    IncidentLevel,
    Period(String),
}

/// Completion-status selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionFilter {
    #[default]
    All,
    NotStarted,
    InProgress,
    Complete,
}

impl CompletionFilter {
    fn matches(self, status: CompletionStatus) -> bool {
        match self {
            Self::All => true,
            Self::NotStarted => status == CompletionStatus::NotStarted,
            Self::InProgress => status == CompletionStatus::InProgress,
            Self::Complete => status == CompletionStatus::Complete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown completion status filter `{0}` (expected all, not-started, in-progress or complete)")]
pub struct ParseCompletionFilterError(String);

impl FromStr for CompletionFilter {
    type Err = ParseCompletionFilterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "" | "all" => Ok(Self::All),
            "not-started" => Ok(Self::NotStarted),
            "in-progress" => Ok(Self::InProgress),
            "complete" | "completed" => Ok(Self::Complete),
            _ => Err(ParseCompletionFilterError(raw.to_string())),
        }
    }
}

const INCIDENT_LEVEL: &str = "incident-level";
const PERIOD_PREFIX: &str = "period:";

impl FromStr for PeriodFilter {
    type Err = std::convert::Infallible;

    /// `""` selects everything and `"incident-level"` selects checklists
    /// without a period. `"period:<id>"` always names a period, so any id is
    /// reachable; anything else is taken as a period id as-is.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Some(id) = trimmed.strip_prefix(PERIOD_PREFIX) {
            return Ok(Self::Period(id.to_string()));
        }
        Ok(match trimmed {
            "" => Self::Any,
            INCIDENT_LEVEL => Self::IncidentLevel,
            id => Self::Period(id.to_string()),
        })
    }
}

impl fmt::Display for PeriodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => Ok(()),
            Self::IncidentLevel => f.write_str(INCIDENT_LEVEL),
            Self::Period(id)
                if id.is_empty() || id == INCIDENT_LEVEL || id.starts_with(PERIOD_PREFIX) =>
            {
                write!(f, "{PERIOD_PREFIX}{id}")
            }
            Self::Period(id) => f.write_str(id),
        }
    }
}

impl fmt::Display for CompletionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::All => "all",
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
        };
        f.write_str(label)
    }
}

/// Transient filter state owned by the view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search_query: String,
    pub period: PeriodFilter,
    pub completion: CompletionFilter,
    /// Archived checklists are excluded by the data layer unless this is set;
    /// the pipeline itself never filters on it.
    pub show_archived: bool,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.search_query.trim().is_empty()
            || self.period != PeriodFilter::Any
            || self.completion != CompletionFilter::All
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Search,
    OperationalPeriod,
    Completion,
    Archived,
}

impl FilterStage {
    pub const PIPELINE: [FilterStage; 4] = [
        FilterStage::Search,
        FilterStage::OperationalPeriod,
        FilterStage::Completion,
        FilterStage::Archived,
    ];

    pub fn keeps(self, checklist: &ChecklistSummary, state: &FilterState) -> bool {
        match self {
            Self::Search => matches_search(checklist, &state.search_query),
            Self::OperationalPeriod => matches_period(checklist, &state.period),
            Self::Completion => state.completion.matches(checklist.completion_status()),
            Self::Archived => true,
        }
    }
}

fn matches_search(checklist: &ChecklistSummary, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    checklist
        .name
        .to_lowercase()
        .contains(&query.to_lowercase())
}

fn matches_period(checklist: &ChecklistSummary, filter: &PeriodFilter) -> bool {
    match filter {
        PeriodFilter::Any => true,
        PeriodFilter::IncidentLevel => checklist.operational_period_id.is_none(),
        PeriodFilter::Period(id) => checklist.operational_period_id.as_deref() == Some(id),
    }
}

/// Run one stage over `checklists`.
pub fn apply_stage(
    stage: FilterStage,
    checklists: Vec<ChecklistSummary>,
    state: &FilterState,
) -> Vec<ChecklistSummary> {
    checklists
        .into_iter()
        .filter(|c| stage.keeps(c, state))
        .collect()
}

/// Run the full pipeline in its fixed stage order.
pub fn apply(checklists: &[ChecklistSummary], state: &FilterState) -> Vec<ChecklistSummary> {
    FilterStage::PIPELINE
        .iter()
        .fold(checklists.to_vec(), |acc, stage| apply_stage(*stage, acc, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{checklist, in_period, with_progress};

    fn names(items: &[ChecklistSummary]) -> Vec<&str> {
        items.iter().map(|c| c.name.as_str()).collect()
    }

    fn sample() -> Vec<ChecklistSummary> {
        vec![
            with_progress(in_period(checklist("a", "Safety Briefing"), "P1"), 0.0),
            with_progress(checklist("b", "Logistics Check"), 40.0),
            with_progress(in_period(checklist("c", "Daily Safety"), "P0"), 100.0),
            with_progress(checklist("d", "Comms Plan"), 100.0),
        ]
    }

    #[test]
    fn search_matches_case_insensitive_substring() {
        let state = FilterState {
            search_query: "safety".to_string(),
            ..FilterState::default()
        };
        let out = apply(&sample(), &state);
        assert_eq!(names(&out), vec!["Safety Briefing", "Daily Safety"]);
    }

    #[test]
    fn blank_search_is_skipped() {
        let state = FilterState {
            search_query: "   ".to_string(),
            ..FilterState::default()
        };
        assert_eq!(apply(&sample(), &state).len(), 4);
    }

    #[test]
    fn incident_level_filter_keeps_null_periods() {
        let state = FilterState {
            period: PeriodFilter::IncidentLevel,
            ..FilterState::default()
        };
        let out = apply(&sample(), &state);
        assert_eq!(names(&out), vec!["Logistics Check", "Comms Plan"]);
    }

    #[test]
    fn specific_period_filter_keeps_matching_ids() {
        let state = FilterState {
            period: PeriodFilter::Period("P0".to_string()),
            ..FilterState::default()
        };
        assert_eq!(names(&apply(&sample(), &state)), vec!["Daily Safety"]);
    }

    #[test]
    fn completion_filter_uses_progress_buckets() {
        let mut state = FilterState {
            completion: CompletionFilter::Complete,
            ..FilterState::default()
        };
        assert_eq!(
            names(&apply(&sample(), &state)),
            vec!["Daily Safety", "Comms Plan"]
        );

        state.completion = CompletionFilter::NotStarted;
        assert_eq!(names(&apply(&sample(), &state)), vec!["Safety Briefing"]);

        state.completion = CompletionFilter::InProgress;
        assert_eq!(names(&apply(&sample(), &state)), vec!["Logistics Check"]);
    }

    #[test]
    fn show_archived_never_filters() {
        let mut items = sample();
        items[0].is_archived = true;
        for show_archived in [false, true] {
            let state = FilterState {
                show_archived,
                ..FilterState::default()
            };
            assert_eq!(apply(&items, &state), items);
        }
    }

    #[test]
    fn parse_filters_from_cli_strings() {
        assert_eq!(
            "incident-level".parse::<PeriodFilter>().unwrap(),
            PeriodFilter::IncidentLevel
        );
        assert_eq!("".parse::<PeriodFilter>().unwrap(), PeriodFilter::Any);
        assert_eq!(
            "P7".parse::<PeriodFilter>().unwrap(),
            PeriodFilter::Period("P7".to_string())
        );
        assert_eq!(
            "In_Progress".parse::<CompletionFilter>().unwrap(),
            CompletionFilter::InProgress
        );
        assert!("halfway".parse::<CompletionFilter>().is_err());
    }

    #[test]
    fn period_ids_that_look_like_keywords_stay_selectable() {
        for id in ["none", "any", "incident"] {
            assert_eq!(
                id.parse::<PeriodFilter>().unwrap(),
                PeriodFilter::Period(id.to_string())
            );
        }
        assert_eq!(
            "period:incident-level".parse::<PeriodFilter>().unwrap(),
            PeriodFilter::Period("incident-level".to_string())
        );

        let reserved = PeriodFilter::Period("incident-level".to_string());
        assert_eq!(reserved.to_string(), "period:incident-level");
        assert_eq!(reserved.to_string().parse::<PeriodFilter>().unwrap(), reserved);
        assert_eq!(PeriodFilter::IncidentLevel.to_string(), "incident-level");
    }

    #[test]
    fn is_active_ignores_archived_flag() {
        let mut state = FilterState {
            show_archived: true,
            ..FilterState::default()
        };
        assert!(!state.is_active());
        state.completion = CompletionFilter::Complete;
        assert!(state.is_active());
    }
}
