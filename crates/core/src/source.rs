/// Failure reported by a content source. `Display` is shown to the user in
/// place of the affected panel's content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ContentSourceError {
    #[error("Cannot connect! {0}")]
    Auth(String),

    #[error("Unable to list folder '{path}'. {message}")]
    Lookup { path: String, message: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

/// Anything that can list the names inside a folder path.
///
/// Calls are blocking; the startup orchestrator moves them off the UI thread.
pub trait ContentSource: Send + Sync {
    fn list_contents(&self, path: &str) -> Result<Vec<String>, ContentSourceError>;
}

impl<T: ContentSource + ?Sized> ContentSource for std::sync::Arc<T> {
    fn list_contents(&self, path: &str) -> Result<Vec<String>, ContentSourceError> {
        (**self).list_contents(path)
    }
}

/// Trim a folder path and map `/` to the empty root path.
pub fn normalize_path(path: &str) -> &str {
    match path.trim() {
        "/" => "",
        trimmed => trimmed,
    }
}

/// Sort listing names by their lowercase form.
pub fn sort_listing(names: &mut [String]) {
    names.sort_by_key(|name| name.to_lowercase());
}
