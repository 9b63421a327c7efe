use anyhow::{Context, Result};
use bandbox_tui::config::{self, Overrides};
use bandbox_tui::RunOptions;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,bandbox=info";

#[derive(Parser)]
#[command(
    name = "bandbox",
    version,
    about = "Pick charts and count instruments from a shared band folder"
)]
struct Cli {
    /// Path to the config file (default: ~/.config/bandbox/bandbox.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the library folder
    #[arg(long)]
    library_path: Option<String>,

    /// Override the instruments folder
    #[arg(long)]
    instruments_path: Option<String>,

    /// Browse a local directory instead of Dropbox
    #[arg(long, value_name = "DIR")]
    local: Option<PathBuf>,

    /// Enable mouse clicks and wheel scrolling
    #[arg(long)]
    mouse: bool,

    /// Write logs here (default: bandbox.log in the config directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file.clone() {
        Some(path) => Some(path),
        None => config::default_log_path().ok(),
    };
    if let Some(path) = log_path {
        init_logging(&path);
    }

    let overrides = Overrides {
        library_path: cli.library_path,
        instruments_path: cli.instruments_path,
        local_root: cli.local,
    };
    let app_config = config::load_app_config(cli.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;

    bandbox_tui::run_with_options(app_config, RunOptions { mouse: cli.mouse })
}

/// Log to a file since the terminal is owned by the UI. Logging stays off when
/// the file cannot be opened.
fn init_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(DEFAULT_LOG_FILTER)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}
