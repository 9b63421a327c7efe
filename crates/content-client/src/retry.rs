use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::warn;

/// Configuration for retrying listing requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub delays: Vec<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::with_max_retries(3)
    }
}

impl RetryConfig {
    /// Exponential backoff starting at one second: 1s, 2s, 4s, ...
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            delays: (0..max_retries.min(8))
                .map(|n| Duration::from_secs(1 << n))
                .collect(),
        }
    }

    /// Retry without sleeping in between.
    pub fn immediate(max_retries: usize) -> Self {
        Self {
            delays: vec![Duration::ZERO; max_retries],
        }
    }

    pub fn max_retries(&self) -> usize {
        self.delays.len()
    }
}

fn is_retryable(resp: &Response) -> bool {
    let status = resp.status();
    status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
}

/// POST a JSON body, retrying on network errors, 5xx and 429.
///
/// Any other response (success or client error) is returned immediately; the
/// last attempt's outcome is returned once retries are used up.
pub fn retry_post(
    client: &Client,
    url: &str,
    auth_token: Option<&str>,
    body: &serde_json::Value,
    config: &RetryConfig,
) -> Result<Response, reqwest::Error> {
    let max_attempts = config.max_retries() + 1;
    let mut attempt = 0;

    loop {
        let mut req = client.post(url);
        if let Some(token) = auth_token {
            req = req.bearer_auth(token);
        }
        let result = req.json(body).send();

        let retryable = match &result {
            Ok(resp) => is_retryable(resp),
            Err(_) => true,
        };
        if !retryable {
            return result;
        }
        let Some(delay) = config.delays.get(attempt).copied() else {
            return result;
        };
        match &result {
            Ok(resp) => warn!(
                "POST {} attempt {}/{} failed (HTTP {}), retrying in {:?}",
                url,
                attempt + 1,
                max_attempts,
                resp.status(),
                delay,
            ),
            Err(e) => warn!(
                "POST {} attempt {}/{} failed ({}), retrying in {:?}",
                url,
                attempt + 1,
                max_attempts,
                e,
                delay,
            ),
        }
        std::thread::sleep(delay);
        attempt += 1;
    }
}
