//! Content sources backing the library and instruments panels.

pub mod client;
pub mod local;
pub mod retry;

use std::sync::Arc;
use std::time::Duration;

use bandbox_core::{ContentSource, ContentSourceError};
use bandbox_runtime_config::{SourceKind, SourceSettings};

pub use client::DropboxClient;
pub use local::LocalDirSource;
pub use retry::RetryConfig;

/// Build the configured source. Blocking: the Dropbox variant verifies its
/// token before returning.
pub fn connect(settings: &SourceSettings) -> Result<Arc<dyn ContentSource>, ContentSourceError> {
    match settings.kind {
        SourceKind::Dropbox => {
            let client = DropboxClient::connect(
                &settings.api_base_url,
                &settings.access_token,
                Duration::from_secs(settings.timeout_secs.max(1)),
                RetryConfig::with_max_retries(settings.max_retries),
            )?;
            Ok(Arc::new(client))
        }
        SourceKind::Local => {
            let Some(root) = settings.local_root.as_deref() else {
                return Err(ContentSourceError::Other(
                    "source.local_root must be set when source.kind = \"local\"".to_string(),
                ));
            };
            Ok(Arc::new(LocalDirSource::new(root)))
        }
    }
}
