//! Partitions checklists into the current operational period, the
//! incident-level bucket and one section per previous period.

use crate::checklist::ChecklistSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Current,
    Incident,
    Previous,
}

/// A derived, never-persisted slice of the grouped view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub operational_period_id: Option<String>,
    pub operational_period_name: Option<String>,
    pub checklists: Vec<ChecklistSummary>,
    /// Mean `progress_percentage` over `checklists`, 0 when empty.
    pub average_progress: f64,
}

impl Section {
    fn new(kind: SectionKind, period_id: Option<String>, checklists: Vec<ChecklistSummary>) -> Self {
        let operational_period_name = checklists
            .iter()
            .find_map(|c| c.operational_period_name.clone());
        let average_progress = average_progress(&checklists);
        Self {
            kind,
            operational_period_id: period_id,
            operational_period_name,
            checklists,
            average_progress,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.checklists.is_empty()
    }

    /// Most recent `created_at` among the members.
    pub fn latest_created_at(&self) -> Option<DateTime<Utc>> {
        self.checklists.iter().map(|c| c.created_at).max()
    }

    pub fn title(&self) -> String {
        match self.kind {
            SectionKind::Current => match &self.operational_period_name {
                Some(name) => format!("Current period: {name}"),
                None => "Current period".to_string(),
            },
            SectionKind::Incident => "Incident-level".to_string(),
            SectionKind::Previous => {
                let label = self
                    .operational_period_name
                    .as_deref()
                    .or(self.operational_period_id.as_deref())
                    .unwrap_or("unknown");
                format!("Previous period: {label}")
            }
        }
    }
}

/// Output of [`group`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedChecklists {
    pub current: Option<Section>,
    pub incident: Option<Section>,
    /// Most recently active period first.
    pub previous: Vec<Section>,
    pub total_checklists: usize,
    /// False when no input checklist carries an operational period; callers
    /// render a flat list in that case.
    pub has_operational_periods: bool,
}

impl GroupedChecklists {
    /// Sections in render order: current, incident, then previous periods.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.current
            .iter()
            .chain(self.incident.iter())
            .chain(self.previous.iter())
    }
}

pub fn average_progress(checklists: &[ChecklistSummary]) -> f64 {
    if checklists.is_empty() {
        return 0.0;
    }
    let total: f64 = checklists.iter().map(|c| c.progress_percentage).sum();
    total / checklists.len() as f64
}

/// True when any checklist is scoped to an operational period.
pub fn has_operational_periods(checklists: &[ChecklistSummary]) -> bool {
    checklists.iter().any(|c| c.operational_period_id.is_some())
}

/// Group `checklists` around `current_period_id`.
///
/// A supplied, non-empty current period always yields a `current` section
/// (possibly empty) and an `incident` section, so the layout stays stable while
/// the list changes. Without one, `current` is absent and `incident` only
/// appears when it has members.
pub fn group(checklists: &[ChecklistSummary], current_period_id: Option<&str>) -> GroupedChecklists {
    let current_period_id = current_period_id
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let mut current = Vec::new();
    let mut incident = Vec::new();
    let mut previous_order: Vec<String> = Vec::new();
    let mut previous: HashMap<String, Vec<ChecklistSummary>> = HashMap::new();

    for checklist in checklists {
        match checklist.operational_period_id.as_deref() {
            None => incident.push(checklist.clone()),
            Some(id) if Some(id) == current_period_id => current.push(checklist.clone()),
            Some(id) => {
                let bucket = previous.entry(id.to_string()).or_insert_with(|| {
                    previous_order.push(id.to_string());
                    Vec::new()
                });
                bucket.push(checklist.clone());
            }
        }
    }

    let total_checklists =
        current.len() + incident.len() + previous.values().map(Vec::len).sum::<usize>();

    let current_section = current_period_id.map(|id| {
        Section::new(SectionKind::Current, Some(id.to_string()), current)
    });
    let incident_section = if !incident.is_empty() || current_section.is_some() {
        Some(Section::new(SectionKind::Incident, None, incident))
    } else {
        None
    };

    let mut previous_sections: Vec<Section> = previous_order
        .into_iter()
        .filter_map(|id| {
            let members = previous.remove(&id)?;
            Some(Section::new(SectionKind::Previous, Some(id), members))
        })
        .collect();
    previous_sections.sort_by(|a, b| {
        b.latest_created_at()
            .cmp(&a.latest_created_at())
            .then_with(|| a.operational_period_id.cmp(&b.operational_period_id))
    });

    GroupedChecklists {
        current: current_section,
        incident: incident_section,
        previous: previous_sections,
        total_checklists,
        has_operational_periods: has_operational_periods(checklists),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{checklist, created_at, in_period, with_progress};
    use std::collections::HashSet;

    fn ids(section: &Section) -> Vec<&str> {
        section.checklists.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn end_to_end_five_checklist_scenario() {
        let input = vec![
            in_period(checklist("c1", "Briefing"), "P1"),
            in_period(checklist("c2", "Staging"), "P1"),
            checklist("c3", "Incident Objectives"),
            created_at(in_period(checklist("c4", "Old Briefing"), "P0"), 1),
            created_at(in_period(checklist("c5", "Old Staging"), "P0"), 2),
        ];

        let grouped = group(&input, Some("P1"));

        let current = grouped.current.as_ref().expect("current section");
        assert_eq!(ids(current), vec!["c1", "c2"]);
        let incident = grouped.incident.as_ref().expect("incident section");
        assert_eq!(ids(incident), vec!["c3"]);
        assert_eq!(grouped.previous.len(), 1);
        assert_eq!(
            grouped.previous[0].operational_period_id.as_deref(),
            Some("P0")
        );
        assert_eq!(ids(&grouped.previous[0]), vec!["c4", "c5"]);
        assert_eq!(grouped.total_checklists, 5);
        assert!(grouped.has_operational_periods);
    }

    #[test]
    fn grouped_output_serializes_in_camel_case() {
        let input = vec![in_period(checklist("c1", "Briefing"), "P1")];
        let value = serde_json::to_value(group(&input, Some("P1"))).expect("serialize");

        assert_eq!(value["totalChecklists"], 1);
        assert_eq!(value["hasOperationalPeriods"], true);
        let current = &value["current"];
        assert_eq!(current["type"], "current");
        assert_eq!(current["operationalPeriodId"], "P1");
        assert!(current.get("averageProgress").is_some());
        assert_eq!(current["checklists"][0]["eventId"], "event-1");
        assert!(current.get("kind").is_none());
    }

    #[test]
    fn current_section_is_kept_when_empty() {
        let input = vec![checklist("c1", "Objectives")];
        let grouped = group(&input, Some("P9"));
        let current = grouped.current.expect("current section");
        assert!(current.is_empty());
        assert_eq!(current.average_progress, 0.0);
        assert!(grouped.incident.is_some());
    }

    #[test]
    fn incident_section_is_kept_empty_with_current_context() {
        let input = vec![in_period(checklist("c1", "Briefing"), "P1")];
        let grouped = group(&input, Some("P1"));
        assert!(grouped.incident.expect("incident section").is_empty());
    }

    #[test]
    fn sections_are_absent_without_current_context() {
        let input = vec![in_period(checklist("c1", "Briefing"), "P1")];
        let grouped = group(&input, None);
        assert!(grouped.current.is_none());
        assert!(grouped.incident.is_none());
        assert_eq!(grouped.previous.len(), 1);

        let blank = group(&input, Some("  "));
        assert!(blank.current.is_none());
    }

    #[test]
    fn previous_sections_sort_by_latest_member_descending() {
        let input = vec![
            created_at(in_period(checklist("a1", "A"), "PA"), 10),
            created_at(in_period(checklist("b1", "B"), "PB"), 5),
            created_at(in_period(checklist("b2", "B2"), "PB"), 20),
            created_at(in_period(checklist("c1", "C"), "PC"), 1),
        ];
        let grouped = group(&input, None);
        let order: Vec<_> = grouped
            .previous
            .iter()
            .filter_map(|s| s.operational_period_id.as_deref())
            .collect();
        assert_eq!(order, vec!["PB", "PA", "PC"]);
    }

    #[test]
    fn average_progress_is_computed_per_section() {
        let input = vec![
            with_progress(in_period(checklist("a", "A"), "P0"), 20.0),
            with_progress(in_period(checklist("b", "B"), "P0"), 60.0),
            with_progress(checklist("c", "C"), 100.0),
        ];
        let grouped = group(&input, None);
        assert_eq!(grouped.previous[0].average_progress, 40.0);
        assert_eq!(grouped.incident.expect("incident").average_progress, 100.0);
    }

    #[test]
    fn no_periods_flag_is_reported() {
        let input = vec![checklist("a", "A"), checklist("b", "B")];
        let grouped = group(&input, None);
        assert!(!grouped.has_operational_periods);
        assert_eq!(grouped.total_checklists, 2);
    }

    #[test]
    fn partition_covers_every_input_exactly_once() {
        let input = vec![
            in_period(checklist("1", "a"), "P1"),
            checklist("2", "b"),
            in_period(checklist("3", "c"), "P0"),
            in_period(checklist("4", "d"), "P2"),
            checklist("5", "e"),
        ];
        let grouped = group(&input, Some("P1"));
        let seen: Vec<&str> = grouped
            .sections()
            .flat_map(|s| s.checklists.iter().map(|c| c.id.as_str()))
            .collect();
        let unique: HashSet<&str> = seen.iter().copied().collect();
        assert_eq!(seen.len(), input.len());
        assert_eq!(unique.len(), input.len());
    }

    #[test]
    fn section_title_prefers_period_name() {
        let mut c = in_period(checklist("a", "A"), "P0");
        c.operational_period_name = Some("Night Shift".to_string());
        let grouped = group(&[c], Some("P1"));
        assert_eq!(grouped.previous[0].title(), "Previous period: Night Shift");
        assert_eq!(grouped.current.expect("current").title(), "Current period");
    }
}
