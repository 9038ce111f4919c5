use std::time::Duration;

use anyhow::{Result, bail};
use serde::Deserialize;
use tracing::debug;

use opchecklist_core::{ChecklistSummary, FetchOptions};

use crate::retry::{RetryConfig, retry_get};

/// Typed HTTP client for the checklist data-access API.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    retry: RetryConfig,
}

/// List endpoints answer either with a bare array or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChecklistListBody {
    Bare(Vec<ChecklistSummary>),
    Wrapped { checklists: Vec<ChecklistSummary> },
}

impl ChecklistListBody {
    fn into_vec(self) -> Vec<ChecklistSummary> {
        match self {
            Self::Bare(items) | Self::Wrapped { checklists: items } => items,
        }
    }
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            retry: RetryConfig::default(),
        }
    }

    pub fn set_auth(&mut self, token: String) {
        self.auth_token = Some(token).filter(|t| !t.is_empty());
    }

    pub fn set_retry(&mut self, retry: RetryConfig) {
        self.retry = retry;
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub fn checklists_url(&self, event_id: &str, options: FetchOptions) -> String {
        format!(
            "{}?include_archived={}&all_positions={}",
            self.url(&format!(
                "/events/{}/checklists",
                urlencoding::encode(event_id)
            )),
            options.include_archived,
            options.all_positions,
        )
    }

    // ── Checklists ────────────────────────────────────────────────────────

    /// Fetch the authoritative checklist list for an event.
    pub async fn fetch_checklists(
        &self,
        event_id: &str,
        options: FetchOptions,
    ) -> Result<Vec<ChecklistSummary>> {
        if event_id.trim().is_empty() {
            bail!("event id is required to fetch checklists");
        }
        let url = self.checklists_url(event_id, options);
        let resp = retry_get(&self.client, &url, self.auth_token(), &self.retry).await?;
        let body: ChecklistListBody = parse_response(resp).await?;
        let items = body.into_vec();
        debug!("fetched {} checklists for event {event_id}", items.len());
        Ok(items)
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an error containing the status and body text.
async fn parse_response<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("{status}: {body}");
    }
    Ok(resp.json().await?)
}
