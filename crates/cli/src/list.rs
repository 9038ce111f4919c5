use std::sync::Arc;

use anyhow::Result;
use opchecklist_core::{CompletionFilter, PeriodFilter};
use opchecklist_local_store::FileStore;
use opchecklist_view::profile::load_profile;
use opchecklist_view::{ChecklistGroupingView, ViewConfig};

use crate::config::{api_client, load_config, resolve_event_id};
use crate::output::{OutputFormat, print_view};

pub struct ListArgs {
    pub event: Option<String>,
    pub current_period: Option<String>,
    pub search: Option<String>,
    pub period: Option<PeriodFilter>,
    pub status: CompletionFilter,
    pub archived: bool,
    pub format: OutputFormat,
}

pub async fn run_list(args: ListArgs) -> Result<()> {
    let config = load_config()?;
    let event_id = resolve_event_id(args.event, &config)?;
    let store = Arc::new(FileStore::open()?);
    let profile = load_profile(store.as_ref());

    let current_period = args
        .current_period
        .or_else(|| config.view.current_period().map(str::to_string));
    let view_config = ViewConfig {
        event_id,
        current_operational_period_id: current_period,
        recent_event_window: config.realtime.recent_event_window,
    };
    let mut view = ChecklistGroupingView::new(view_config, profile, store, None);
    view.set_show_archived(args.archived || config.view.include_archived);
    if let Some(query) = args.search {
        view.set_search_query(query);
    }
    if let Some(period) = args.period {
        view.set_period_filter(period);
    }
    view.set_completion_filter(args.status);

    let client = api_client(&config)?;
    view.refresh(&client).await?;
    print_view(&view.render(), args.format)
}
