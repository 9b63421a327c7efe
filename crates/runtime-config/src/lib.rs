//! Typed configuration for the bandbox terminal client.
//!
//! `bandbox.toml` is read once at startup into an [`AppConfig`]; every key is
//! optional and falls back to a serde default. After loading, call
//! [`AppConfig::normalize`] so blank strings behave like missing keys.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "bandbox.toml";

/// Environment variable that supplies the Dropbox token when the file doesn't.
pub const TOKEN_ENV_VAR: &str = "BANDBOX_DROPBOX_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub library: LibrarySettings,
    #[serde(default)]
    pub instruments: InstrumentSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub start: StartSettings,
}

/// Titles, placeholders and labels shown by the terminal UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiSettings {
    pub title: String,
    pub loading_message: String,
    pub library_title: String,
    pub library_placeholder: String,
    pub library_empty_message: String,
    pub detail_title: String,
    pub detail_placeholder: String,
    pub detail_error_message: String,
    pub instruments_title: String,
    pub instruments_placeholder: String,
    pub instruments_empty_message: String,
    pub selection_heading: String,
    pub selection_placeholder: String,
    pub tally_heading: String,
    pub tally_placeholder: String,
    pub start_label: String,
    pub start_running_label: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            title: "Band Dropbox Client".to_string(),
            loading_message: "Warming up the stage...".to_string(),
            library_title: "Library".to_string(),
            library_placeholder:
                "Dropbox folders and files will appear here once the data layer is ready."
                    .to_string(),
            library_empty_message: "This folder is empty.".to_string(),
            detail_title: "Details".to_string(),
            detail_placeholder: "Select an item to see its metadata and preview details."
                .to_string(),
            detail_error_message: "Unable to show details.".to_string(),
            instruments_title: "Instruments".to_string(),
            instruments_placeholder: "Instruments will appear here once loaded.".to_string(),
            instruments_empty_message: "No instruments found.".to_string(),
            selection_heading: "Selected items".to_string(),
            selection_placeholder: "No items selected.".to_string(),
            tally_heading: "Instrument counts".to_string(),
            tally_placeholder: "No instruments counted.".to_string(),
            start_label: "Ready".to_string(),
            start_running_label: "Starting...".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LibrarySettings {
    /// Folder listed into the library panel; empty string is the root.
    #[serde(default)]
    pub path: String,
    /// Literal suffix removed from library names (e.g. `_altsax.pdf`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InstrumentSettings {
    /// Folder listed into the instruments panel. Unset = panel stays empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Comma-separated substrings; matching instruments are hidden.
    #[serde(default)]
    pub exclude_substrings: String,
}

impl InstrumentSettings {
    pub fn exclusions(&self) -> Vec<String> {
        self.exclude_substrings
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Dropbox,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSettings {
    #[serde(default)]
    pub kind: SourceKind,
    /// Root directory for `kind = "local"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_root: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Dropbox,
            local_root: None,
            api_base_url: default_api_base_url(),
            access_token: String::new(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartSettings {
    /// How long the simulated background action runs.
    #[serde(default = "default_start_duration_ms")]
    pub duration_ms: u64,
}

impl Default for StartSettings {
    fn default() -> Self {
        Self {
            duration_ms: default_start_duration_ms(),
        }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_api_base_url() -> String {
    "https://api.dropboxapi.com/2".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_retries() -> u32 {
    3
}
fn default_start_duration_ms() -> u64 {
    3_000
}

// ── Loading ─────────────────────────────────────────────────────────────

impl AppConfig {
    /// Parse TOML text and normalize it.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.normalize();
        Ok(config)
    }

    /// Load `path`, returning defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let mut config = Self::default();
            config.normalize();
            return Ok(config);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Trim values and replace blanks with defaults.
    /// Returns true when any field was updated.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        let defaults = UiSettings::default();

        for (value, fallback) in [
            (&mut self.ui.title, defaults.title),
            (&mut self.ui.loading_message, defaults.loading_message),
            (&mut self.ui.library_title, defaults.library_title),
            (&mut self.ui.library_placeholder, defaults.library_placeholder),
            (&mut self.ui.library_empty_message, defaults.library_empty_message),
            (&mut self.ui.detail_title, defaults.detail_title),
            (&mut self.ui.detail_placeholder, defaults.detail_placeholder),
            (&mut self.ui.detail_error_message, defaults.detail_error_message),
            (&mut self.ui.instruments_title, defaults.instruments_title),
            (&mut self.ui.instruments_placeholder, defaults.instruments_placeholder),
            (&mut self.ui.instruments_empty_message, defaults.instruments_empty_message),
            (&mut self.ui.selection_heading, defaults.selection_heading),
            (&mut self.ui.selection_placeholder, defaults.selection_placeholder),
            (&mut self.ui.tally_heading, defaults.tally_heading),
            (&mut self.ui.tally_placeholder, defaults.tally_placeholder),
            (&mut self.ui.start_label, defaults.start_label),
            (&mut self.ui.start_running_label, defaults.start_running_label),
            (&mut self.source.api_base_url, default_api_base_url()),
        ] {
            changed |= trim_or_default(value, fallback);
        }

        changed |= trim_in_place(&mut self.library.path);
        changed |= trim_in_place(&mut self.source.access_token);
        for value in [
            &mut self.library.suffix,
            &mut self.instruments.path,
            &mut self.instruments.suffix,
            &mut self.source.local_root,
        ] {
            changed |= blank_to_none(value);
        }

        changed
    }

    /// Fill a blank access token from `value` (normally the environment).
    pub fn apply_token_override(&mut self, value: Option<String>) -> bool {
        if !self.source.access_token.is_empty() {
            return false;
        }
        match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            Some(token) => {
                self.source.access_token = token;
                true
            }
            None => false,
        }
    }
}

fn trim_or_default(value: &mut String, fallback: String) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        *value = fallback;
        return true;
    }
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
        return true;
    }
    false
}

fn trim_in_place(value: &mut String) -> bool {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        return false;
    }
    *value = trimmed.to_string();
    true
}

fn blank_to_none(value: &mut Option<String>) -> bool {
    let Some(current) = value.as_mut() else {
        return false;
    };
    if current.trim().is_empty() {
        *value = None;
        return true;
    }
    trim_in_place(current)
}
