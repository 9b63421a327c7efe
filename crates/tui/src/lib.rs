mod app;
mod async_ops;
pub mod config;
mod theme;
mod ui;
mod views;

use anyhow::Result;
use app::App;
use bandbox_runtime_config::AppConfig;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, info};

enum BgEvent {
    Command(async_ops::CommandResult),
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Capture mouse clicks and wheel events.
    pub mouse: bool,
}

/// Launch the TUI with a loaded configuration.
pub fn run_with_options(config: AppConfig, options: RunOptions) -> Result<()> {
    let mut app = App::new(config);
    app.request_load();

    // Terminal setup, splash shows on the first frame
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    if options.mouse {
        stdout().execute(EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = event_loop(&mut terminal, &mut app, options.mouse);

    // Restore terminal
    disable_raw_mode()?;
    if options.mouse {
        stdout().execute(DisableMouseCapture)?;
    }
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    mouse_capture_enabled: bool,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let (tx, bg_rx) = mpsc::channel::<BgEvent>();

    let outcome = loop {
        // ── Poll background results ──────────────────────────────────
        while let Ok(ev) = bg_rx.try_recv() {
            match ev {
                BgEvent::Command(result) => app.apply_command_result(result),
            }
        }

        // ── Dispatch queued commands onto the runtime ────────────────
        for cmd in app.take_pending_commands() {
            let tx = tx.clone();
            let source = app.config.source.clone();
            rt.spawn(async move {
                let result = async_ops::execute(cmd, source).await;
                if tx.send(BgEvent::Command(result)).is_err() {
                    debug!("event loop gone; dropping background result");
                }
            });
        }

        if let Err(err) = terminal.draw(|frame| ui::render(frame, app)) {
            break Err(err.into());
        }

        let polled = match event::poll(Duration::from_millis(100)) {
            Ok(polled) => polled,
            Err(err) => break Err(err.into()),
        };
        if !polled {
            continue;
        }
        let ev = match event::read() {
            Ok(ev) => ev,
            Err(err) => break Err(err.into()),
        };
        match ev {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.handle_key_event(key) {
                    break Ok(());
                }
            }
            Event::Mouse(mouse) => {
                if !mouse_capture_enabled {
                    continue;
                }
                if app.handle_mouse(mouse) {
                    break Ok(());
                }
            }
            _ => {}
        }
    };

    // In-flight loads and start actions are abandoned; their results never
    // reach the session.
    drop(bg_rx);
    rt.shutdown_background();
    info!("event loop stopped");
    outcome
}
