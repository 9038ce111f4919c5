use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use opchecklist_core::events::{EventLine, read_event_lines};
use opchecklist_local_store::FileStore;
use opchecklist_view::profile::load_profile;
use opchecklist_view::{ChecklistGroupingView, FeedMessage, Toast, ViewConfig};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::{api_client, load_config};
use crate::output::render_text;

const FEED_CAPACITY: usize = 64;

fn read_events(path: &Path) -> Result<Vec<EventLine>> {
    if path.as_os_str() == "-" {
        let stdin = std::io::stdin();
        return read_event_lines(stdin.lock()).context("Failed to read events from stdin");
    }
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    read_event_lines(BufReader::new(file))
        .with_context(|| format!("Failed to read events from {}", path.display()))
}

/// The replayed stream behaves as a live channel: it starts connected unless
/// its first line says otherwise.
fn feed_messages(lines: Vec<EventLine>) -> Vec<FeedMessage> {
    let mut messages: Vec<FeedMessage> = lines
        .into_iter()
        .filter_map(FeedMessage::from_event_line)
        .collect();
    if !matches!(
        messages.first(),
        Some(FeedMessage::Connected | FeedMessage::Disconnected)
    ) {
        messages.insert(0, FeedMessage::Connected);
    }
    messages
}

pub async fn run_watch(events: &Path, refresh: bool, event: Option<String>) -> Result<()> {
    let config = load_config()?;
    if !config.realtime.enabled {
        bail!("Realtime updates are disabled. Set realtime.enabled = true in the config.");
    }
    let messages = feed_messages(read_events(events)?);
    debug!("replaying {} feed messages", messages.len());

    let store = Arc::new(FileStore::open()?);
    let profile = load_profile(store.as_ref());
    let event_id = event
        .unwrap_or_else(|| config.view.event_id.clone())
        .trim()
        .to_string();
    let view_config = ViewConfig {
        event_id,
        current_operational_period_id: config.view.current_period().map(str::to_string),
        recent_event_window: config.realtime.recent_event_window,
    };
    let mut view = ChecklistGroupingView::new(view_config, profile, store, None)
        .with_notifier(|toast: &Toast| println!("{}", toast.message()));
    view.set_show_archived(config.view.include_archived);

    let (tx, mut rx) = mpsc::channel(FEED_CAPACITY);
    let producer = tokio::spawn(async move {
        for message in messages {
            if tx.send(message).await.is_err() {
                break;
            }
        }
    });
    let counted = view.pump(&mut rx).await;
    producer.await.context("event replay task failed")?;

    println!(
        "{counted} new checklist(s), {} pending update(s)",
        view.pending_count()
    );

    if refresh {
        if view.event_id().is_empty() {
            bail!("No event selected. Pass --event or run: opchecklist config --event <id>");
        }
        let client = api_client(&config)?;
        view.refresh(&client).await?;
        print!("{}", render_text(&view.render()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opchecklist_core::events::event_lines_from_str;

    #[test]
    fn replay_starts_connected_by_default() {
        let lines = event_lines_from_str(
            r#"{"type":"checklist_created","checklistId":"c1","checklistName":"A","createdBy":"jo","positions":null}"#,
        )
        .expect("parse");
        let messages = feed_messages(lines);
        assert_eq!(messages[0], FeedMessage::Connected);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn explicit_leading_disconnect_is_respected() {
        let lines = event_lines_from_str(
            "{\"type\":\"disconnected\"}\n{\"type\":\"connected\"}\n",
        )
        .expect("parse");
        assert_eq!(
            feed_messages(lines),
            vec![FeedMessage::Disconnected, FeedMessage::Connected]
        );
    }
}
