use std::future::Future;

use opchecklist_api_client::ApiClient;
use opchecklist_core::{ChecklistSummary, FetchOptions};

/// Authoritative provider of the checklist list for an event.
pub trait ChecklistSource {
    fn fetch_checklists(
        &self,
        event_id: &str,
        options: FetchOptions,
    ) -> impl Future<Output = anyhow::Result<Vec<ChecklistSummary>>>;
}

impl ChecklistSource for ApiClient {
    fn fetch_checklists(
        &self,
        event_id: &str,
        options: FetchOptions,
    ) -> impl Future<Output = anyhow::Result<Vec<ChecklistSummary>>> {
        ApiClient::fetch_checklists(self, event_id, options)
    }
}
