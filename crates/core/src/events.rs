//! Realtime checklist-creation events and a newline-delimited JSON reader for
//! replaying them.
//!
//! A replay stream looks like:
//! ```jsonl
//! {"type":"checklist_created","checklistId":"c1","checklistName":"Briefing","createdBy":"jo","positions":null}
//! {"type":"checklist_created","checklistId":"c2","checklistName":"Staging","createdBy":"al","positions":"Safety Officer"}
//! ```

use crate::checklist::split_positions;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};

/// Pushed by the realtime channel whenever a checklist is created in the
/// same event scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationEvent {
    pub checklist_id: String,
    pub checklist_name: String,
    #[serde(default)]
    pub created_by: String,
    /// Comma-joined position labels; `None` means visible to every position.
    #[serde(default)]
    pub positions: Option<String>,
}

impl CreationEvent {
    /// Whether the event concerns a caller holding `position`.
    ///
    /// Matching is exact and case-sensitive on trimmed labels.
    pub fn is_visible_to(&self, position: Option<&str>) -> bool {
        let Some(raw) = self.positions.as_deref() else {
            return true;
        };
        let Some(position) = position.map(str::trim).filter(|p| !p.is_empty()) else {
            return false;
        };
        split_positions(raw).any(|label| label == position)
    }
}

/// A single line in a creation-event replay stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum EventLine {
    #[serde(rename = "checklist_created")]
    Created(CreationEvent),
    #[serde(rename = "connected")]
    Connected,
    #[serde(rename = "disconnected")]
    Disconnected,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EventStreamError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error at line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
}

/// Read every line of a replay stream. Blank lines are skipped.
pub fn read_event_lines<R: BufRead>(reader: R) -> Result<Vec<EventLine>, EventStreamError> {
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = serde_json::from_str(&line).map_err(|e| EventStreamError::Json {
            line: idx + 1,
            source: e,
        })?;
        out.push(parsed);
    }
    Ok(out)
}

pub fn event_lines_from_str(s: &str) -> Result<Vec<EventLine>, EventStreamError> {
    read_event_lines(io::BufReader::new(s.as_bytes()))
}
