use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bandbox_core::source::{normalize_path, sort_listing};
use bandbox_core::{ContentSource, ContentSourceError};
use tracing::debug;

/// Lists folders under a local root directory, mirroring the Dropbox layout.
///
/// Source paths are interpreted relative to `root`; a leading `/` is ignored.
#[derive(Debug, Clone)]
pub struct LocalDirSource {
    root: PathBuf,
}

impl LocalDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let relative = normalize_path(path).trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

impl ContentSource for LocalDirSource {
    fn list_contents(&self, path: &str) -> Result<Vec<String>, ContentSourceError> {
        let dir = self.resolve(path);
        debug!("listing local folder {}", dir.display());

        let read = std::fs::read_dir(&dir).map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::NotADirectory => ContentSourceError::Lookup {
                path: match normalize_path(path) {
                    "" => "/".to_string(),
                    folder => folder.to_string(),
                },
                message: e.to_string(),
            },
            _ => ContentSourceError::Io(format!("{}: {e}", dir.display())),
        })?;

        let mut names = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| ContentSourceError::Io(format!("{}: {e}", dir.display())))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        sort_listing(&mut names);
        Ok(names)
    }
}
