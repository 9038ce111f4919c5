use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

/// Configuration for retry behaviour on idempotent GET requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: usize,
    /// Delay in seconds before each retry.
    pub delays: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delays: vec![1, 2],
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delays: Vec::new(),
        }
    }

    fn delay_for(&self, attempt: usize) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let secs = self
            .delays
            .get(attempt)
            .or(self.delays.last())
            .copied()
            .unwrap_or(1);
        Some(Duration::from_secs(secs))
    }
}

/// Retry an authenticated HTTP GET.
///
/// Retries on network errors and 5xx responses.
/// Returns immediately on success or 4xx.
pub async fn retry_get(
    client: &reqwest::Client,
    url: &str,
    auth_token: Option<&str>,
    config: &RetryConfig,
) -> Result<reqwest::Response> {
    let max_attempts = config.max_retries + 1;
    let mut attempt = 0;

    loop {
        let mut req = client.get(url);
        if let Some(token) = auth_token {
            req = req.bearer_auth(token);
        }

        match req.send().await {
            Ok(resp) if resp.status().is_server_error() => match config.delay_for(attempt) {
                Some(delay) => {
                    warn!(
                        "GET attempt {}/{} failed (HTTP {}), retrying in {}s…",
                        attempt + 1,
                        max_attempts,
                        resp.status(),
                        delay.as_secs(),
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Ok(resp),
            },
            Ok(resp) => return Ok(resp),
            Err(e) => match config.delay_for(attempt) {
                Some(delay) => {
                    warn!(
                        "GET attempt {}/{} failed ({}), retrying in {}s…",
                        attempt + 1,
                        max_attempts,
                        e,
                        delay.as_secs(),
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(e).context("Failed to connect after retries"),
            },
        }
        attempt += 1;
    }
}
