use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use bandbox_core::{ProjectionLabels, StartupPlan};
use bandbox_runtime_config::{AppConfig, SourceKind, CONFIG_FILE_NAME, TOKEN_ENV_VAR};
use tracing::{debug, info};

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV_VAR: &str = "BANDBOX_CONFIG_DIR";

const LOG_FILE_NAME: &str = "bandbox.log";

// ── File locations ──────────────────────────────────────────────────────

pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
        let dir = dir.trim();
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("bandbox"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

pub fn default_log_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(LOG_FILE_NAME))
}

// ── Loading ─────────────────────────────────────────────────────────────

/// Command-line overrides layered on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub library_path: Option<String>,
    pub instruments_path: Option<String>,
    pub local_root: Option<PathBuf>,
}

/// Load the config file (defaults when missing), then apply the token
/// environment variable and CLI overrides, then normalize.
pub fn load_app_config(path: Option<&Path>, overrides: &Overrides) -> Result<AppConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };
    let mut config = AppConfig::load(&path)?;
    info!("configuration loaded from {}", path.display());

    if config.apply_token_override(std::env::var(TOKEN_ENV_VAR).ok()) {
        debug!("access token taken from {TOKEN_ENV_VAR}");
    }
    apply_overrides(&mut config, overrides);
    if config.normalize() {
        debug!("blank configuration values replaced with defaults");
    }
    Ok(config)
}

pub fn apply_overrides(config: &mut AppConfig, overrides: &Overrides) {
    if let Some(path) = &overrides.library_path {
        config.library.path = path.clone();
    }
    if let Some(path) = &overrides.instruments_path {
        config.instruments.path = Some(path.clone());
    }
    if let Some(root) = &overrides.local_root {
        config.source.kind = SourceKind::Local;
        config.source.local_root = Some(root.to_string_lossy().into_owned());
    }
}

// ── Snapshots handed to the core ────────────────────────────────────────

pub fn startup_plan(config: &AppConfig) -> StartupPlan {
    StartupPlan {
        library_path: config.library.path.clone(),
        library_suffix: config.library.suffix.clone(),
        instruments_path: config.instruments.path.clone(),
        instruments_suffix: config.instruments.suffix.clone(),
        instruments_exclusions: config.instruments.exclusions(),
    }
}

pub fn projection_labels(config: &AppConfig) -> ProjectionLabels {
    let ui = &config.ui;
    ProjectionLabels {
        selection_heading: ui.selection_heading.clone(),
        selection_placeholder: ui.selection_placeholder.clone(),
        tally_heading: ui.tally_heading.clone(),
        tally_placeholder: ui.tally_placeholder.clone(),
        detail_placeholder: ui.detail_placeholder.clone(),
        detail_error: ui.detail_error_message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_paths_and_switch_to_local() {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            &Overrides {
                library_path: Some("/Gigs".into()),
                instruments_path: Some("/Parts".into()),
                local_root: Some(PathBuf::from("/srv/band")),
            },
        );
        assert_eq!(config.library.path, "/Gigs");
        assert_eq!(config.instruments.path.as_deref(), Some("/Parts"));
        assert_eq!(config.source.kind, SourceKind::Local);
        assert_eq!(config.source.local_root.as_deref(), Some("/srv/band"));
    }

    #[test]
    fn load_reads_explicit_path_and_builds_plan() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
[library]
path = "/Charts"
suffix = "_altsax.pdf"

[instruments]
path = "/Parts"
suffix = ".pdf"
exclude_substrings = "draft, old"
"#,
        )
        .expect("write config");

        let config = load_app_config(Some(&path), &Overrides::default()).expect("load");
        let plan = startup_plan(&config);
        assert_eq!(plan.library_path, "/Charts");
        assert_eq!(plan.library_suffix.as_deref(), Some("_altsax.pdf"));
        assert_eq!(plan.instruments_path.as_deref(), Some("/Parts"));
        assert_eq!(plan.instruments_exclusions, vec!["draft", "old"]);
    }

    #[test]
    fn labels_follow_ui_settings() {
        let mut config = AppConfig::default();
        config.ui.selection_heading = "Setlist".into();
        config.ui.detail_error_message = "Nope.".into();
        let labels = projection_labels(&config);
        assert_eq!(labels.selection_heading, "Setlist");
        assert_eq!(labels.detail_error, "Nope.");
    }
}
