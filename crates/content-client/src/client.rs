use std::time::Duration;

use bandbox_core::source::{normalize_path, sort_listing};
use bandbox_core::{ContentSource, ContentSourceError};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::retry::{retry_post, RetryConfig};

/// Blocking Dropbox folder-listing client.
///
/// Only the RPC endpoints needed to list a folder are covered:
/// `users/get_current_account` to check the token, then
/// `files/list_folder` and `files/list_folder/continue` to page results.
pub struct DropboxClient {
    client: Client,
    base_url: String,
    access_token: String,
    retry: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct ListFolderResult {
    entries: Vec<Metadata>,
    cursor: String,
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_summary: String,
}

impl DropboxClient {
    /// Create a client without contacting the server.
    pub fn new(
        base_url: &str,
        access_token: &str,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, ContentSourceError> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(ContentSourceError::Auth(
                "The Dropbox access token is missing in the configuration.".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContentSourceError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            retry,
        })
    }

    /// Create a client and verify the token against the account endpoint.
    pub fn connect(
        base_url: &str,
        access_token: &str,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Result<Self, ContentSourceError> {
        let client = Self::new(base_url, access_token, timeout, retry)?;
        client.verify()?;
        info!("connected to Dropbox at {}", client.base_url);
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn post(&self, endpoint: &str, body: &serde_json::Value) -> Result<Response, ContentSourceError> {
        retry_post(
            &self.client,
            &self.url(endpoint),
            Some(&self.access_token),
            body,
            &self.retry,
        )
        .map_err(|e| ContentSourceError::Transport(e.to_string()))
    }

    pub fn verify(&self) -> Result<(), ContentSourceError> {
        let resp = self.post("users/get_current_account", &serde_json::Value::Null)?;
        match resp.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(ContentSourceError::Auth(error_summary(resp))),
            status => Err(ContentSourceError::Transport(format!(
                "{status}: {}",
                error_summary(resp)
            ))),
        }
    }

    fn list_page(
        &self,
        endpoint: &str,
        body: serde_json::Value,
        folder: &str,
    ) -> Result<ListFolderResult, ContentSourceError> {
        let resp = self.post(endpoint, &body)?;
        match resp.status() {
            status if status.is_success() => resp
                .json::<ListFolderResult>()
                .map_err(|e| ContentSourceError::Transport(format!("invalid listing: {e}"))),
            StatusCode::UNAUTHORIZED => Err(ContentSourceError::Auth(error_summary(resp))),
            StatusCode::CONFLICT => Err(ContentSourceError::Lookup {
                path: folder.to_string(),
                message: error_summary(resp),
            }),
            status => Err(ContentSourceError::Transport(format!(
                "{status}: {}",
                error_summary(resp)
            ))),
        }
    }
}

impl ContentSource for DropboxClient {
    fn list_contents(&self, path: &str) -> Result<Vec<String>, ContentSourceError> {
        let path = normalize_path(path);
        let folder = if path.is_empty() { "/" } else { path };

        let mut page = self.list_page("files/list_folder", json!({ "path": path }), folder)?;
        let mut names: Vec<String> = page.entries.drain(..).map(|entry| entry.name).collect();
        while page.has_more {
            debug!("listing {folder}: fetching next page");
            page = self.list_page(
                "files/list_folder/continue",
                json!({ "cursor": page.cursor }),
                folder,
            )?;
            names.extend(page.entries.drain(..).map(|entry| entry.name));
        }

        sort_listing(&mut names);
        Ok(names)
    }
}

/// Extract Dropbox's `error_summary`, falling back to the raw body.
fn error_summary(resp: Response) -> String {
    let body = resp.text().unwrap_or_default();
    serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .map(|parsed| parsed.error_summary)
        .filter(|summary| !summary.is_empty())
        .unwrap_or(body)
}
