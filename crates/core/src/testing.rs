use crate::{ChecklistSummary, CreationEvent};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Incident-level checklist with zero progress, created at a fixed instant.
pub fn checklist(id: &str, name: &str) -> ChecklistSummary {
    ChecklistSummary {
        id: id.to_string(),
        name: name.to_string(),
        event_id: "event-1".to_string(),
        operational_period_id: None,
        operational_period_name: None,
        progress_percentage: 0.0,
        completed_items: 0,
        total_items: 4,
        assigned_positions: String::new(),
        is_archived: false,
        created_at: base_time(),
        created_by: "tester".to_string(),
    }
}

pub fn in_period(mut checklist: ChecklistSummary, period_id: &str) -> ChecklistSummary {
    checklist.operational_period_id = Some(period_id.to_string());
    checklist
}

pub fn with_progress(mut checklist: ChecklistSummary, progress: f64) -> ChecklistSummary {
    checklist.progress_percentage = progress;
    checklist.completed_items = (f64::from(checklist.total_items) * progress / 100.0) as u32;
    checklist
}

/// Shift `created_at` by `minutes` past the fixed base instant.
pub fn created_at(mut checklist: ChecklistSummary, minutes: i64) -> ChecklistSummary {
    checklist.created_at = base_time() + Duration::minutes(minutes);
    checklist
}

pub fn creation_event(checklist_id: &str, positions: Option<&str>) -> CreationEvent {
    CreationEvent {
        checklist_id: checklist_id.to_string(),
        checklist_name: format!("Checklist {checklist_id}"),
        created_by: "tester".to_string(),
        positions: positions.map(str::to_string),
    }
}
