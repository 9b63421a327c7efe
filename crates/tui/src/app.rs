use std::time::Duration;

use bandbox_core::{
    project, Interaction, PanelKind, ProjectionLabels, SessionState, SingleFlight,
    StartupOrchestrator,
};
use bandbox_runtime_config::AppConfig;
use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use ratatui::widgets::ListState;
use tracing::{debug, info, warn};

use crate::async_ops::{AsyncCommand, CommandResult};
use crate::config;
pub use crate::views::modal::{ConfirmAction, Modal};

/// Flash message severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

/// Inner list areas from the last frame, used for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelAreas {
    pub library: Rect,
    pub instruments: Rect,
}

impl PanelAreas {
    fn hit(&self, column: u16, row: u16) -> Option<(PanelKind, Rect)> {
        let pos = Position::new(column, row);
        if self.library.contains(pos) {
            Some((PanelKind::Library, self.library))
        } else if self.instruments.contains(pos) {
            Some((PanelKind::Instruments, self.instruments))
        } else {
            None
        }
    }
}

pub struct App {
    pub config: AppConfig,
    pub labels: ProjectionLabels,
    pub state: SessionState,
    pub focus: PanelKind,

    orchestrator: StartupOrchestrator,
    start_flight: SingleFlight,
    pub pending_commands: Vec<AsyncCommand>,

    pub flash_message: Option<(String, FlashLevel)>,
    pub modal: Option<Modal>,

    pub library_list_state: ListState,
    pub instruments_list_state: ListState,
    pub panel_areas: PanelAreas,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let labels = config::projection_labels(&config);
        let orchestrator = StartupOrchestrator::new(config::startup_plan(&config));
        Self {
            config,
            labels,
            state: SessionState::new(),
            focus: PanelKind::Library,
            orchestrator,
            start_flight: SingleFlight::new(),
            pending_commands: Vec::new(),
            flash_message: None,
            modal: None,
            library_list_state: ListState::default(),
            instruments_list_state: ListState::default(),
            panel_areas: PanelAreas::default(),
        }
    }

    // ── Background work ─────────────────────────────────────────────────

    /// Queue a load of both panels, resetting the session. Refused while a
    /// load is already in flight.
    pub fn request_load(&mut self) -> bool {
        let Some(run) = self.orchestrator.begin() else {
            self.flash_info("Already loading");
            return false;
        };
        self.state.begin_reload();
        self.focus = PanelKind::Library;
        self.pending_commands.push(AsyncCommand::LoadPanels(run));
        true
    }

    pub fn is_loading_panels(&self) -> bool {
        self.orchestrator.is_running()
    }

    /// Queue the start action unless it is already running.
    pub fn request_start(&mut self) -> bool {
        let Some(permit) = self.start_flight.try_acquire() else {
            debug!("start already running; ignoring");
            return false;
        };
        let duration = Duration::from_millis(self.config.start.duration_ms);
        self.pending_commands.push(AsyncCommand::Start { duration, permit });
        true
    }

    pub fn is_starting(&self) -> bool {
        self.start_flight.is_busy()
    }

    pub fn take_pending_commands(&mut self) -> Vec<AsyncCommand> {
        std::mem::take(&mut self.pending_commands)
    }

    pub fn apply_command_result(&mut self, result: CommandResult) {
        match result {
            CommandResult::PanelsLoaded { outcome, run } => {
                let library_failed = outcome.library.is_err();
                let any_failed = library_failed || outcome.instruments.is_err();
                outcome.apply_to(&mut self.state);
                drop(run);
                if library_failed && self.state.status(PanelKind::Instruments).is_ready() {
                    self.focus = PanelKind::Instruments;
                }
                if any_failed {
                    self.flash_error("Load failed, press r to retry");
                }
                info!("panels loaded");
            }
            CommandResult::StartFinished { elapsed, permit } => {
                drop(permit);
                info!("start action finished after {:?}", elapsed);
                self.flash_success("Start finished");
            }
        }
    }

    // ── Input ───────────────────────────────────────────────────────────

    /// Returns true if the app should quit.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        self.handle_key(key.code)
    }

    /// Returns true if the app should quit.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        // Clear flash message on any key press
        self.flash_message = None;

        // Modal intercepts all keys when active
        if self.modal.is_some() {
            return self.handle_modal_key(key);
        }

        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Tab | KeyCode::BackTab => self.focus = self.focus.other(),
            KeyCode::Left | KeyCode::Char('h') => self.focus = PanelKind::Library,
            KeyCode::Right | KeyCode::Char('l') => self.focus = PanelKind::Instruments,
            KeyCode::Up | KeyCode::Char('k') => self.move_highlight(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_highlight(1),
            KeyCode::Home | KeyCode::Char('g') => self.highlight_to(0),
            KeyCode::End | KeyCode::Char('G') => self.highlight_to(usize::MAX),
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.interact(Interaction::Select {
                    panel: self.focus,
                    index: self.state.cursor(self.focus),
                });
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.interact(Interaction::Increment {
                    panel: self.focus,
                    index: self.state.cursor(self.focus),
                });
            }
            KeyCode::Char('-') | KeyCode::Backspace | KeyCode::Delete => {
                self.interact(Interaction::Decrement {
                    panel: self.focus,
                    index: self.state.cursor(self.focus),
                });
            }
            KeyCode::Char('u') => {
                if !self.interact(Interaction::Undo) {
                    self.flash_info("Nothing to undo");
                }
            }
            KeyCode::Char('c') => {
                if self.has_marks() {
                    self.modal = Some(Modal::Confirm {
                        title: "Clear all".to_string(),
                        message: "Deselect every item and reset all counts?".to_string(),
                        action: ConfirmAction::ClearAll,
                    });
                } else {
                    self.flash_info("Nothing to clear");
                }
            }
            KeyCode::Char('s') => {
                if !self.request_start() {
                    self.flash_info("Already running");
                }
            }
            KeyCode::Char('r') => {
                if self.is_loading_panels() {
                    self.flash_info("Already loading");
                } else if self.has_marks() {
                    self.modal = Some(Modal::Confirm {
                        title: "Reload".to_string(),
                        message: "Reloading discards selections and counts.".to_string(),
                        action: ConfirmAction::Reload,
                    });
                } else {
                    self.request_load();
                }
            }
            _ => {}
        }
        false
    }

    fn handle_modal_key(&mut self, key: KeyCode) -> bool {
        let Some(modal) = self.modal.take() else {
            return false;
        };

        let action = match &modal {
            Modal::Confirm { action, .. } => *action,
        };
        match key {
            KeyCode::Char('y') | KeyCode::Enter => match action {
                ConfirmAction::ClearAll => {
                    if self.interact(Interaction::ClearAll) {
                        self.flash_success("Cleared");
                    }
                }
                ConfirmAction::Reload => {
                    if self.request_load() {
                        info!("reload requested");
                    }
                }
            },
            KeyCode::Char('n') | KeyCode::Esc => {}
            _ => {
                // Keep modal open for unrecognized keys
                self.modal = Some(modal);
            }
        }
        false
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        if self.modal.is_some() {
            return false;
        }
        let hit = self.panel_areas.hit(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((panel, area)) = hit {
                    self.focus = panel;
                    if let Some(index) = self.row_at(panel, area, mouse.row) {
                        self.interact(Interaction::Select { panel, index });
                    }
                }
            }
            MouseEventKind::Down(MouseButton::Right) => {
                if let Some((PanelKind::Instruments, area)) = hit {
                    self.focus = PanelKind::Instruments;
                    if let Some(index) = self.row_at(PanelKind::Instruments, area, mouse.row) {
                        self.interact(Interaction::Decrement {
                            panel: PanelKind::Instruments,
                            index,
                        });
                    }
                }
            }
            MouseEventKind::ScrollUp => {
                if let Some((panel, _)) = hit {
                    self.focus = panel;
                }
                self.move_highlight(-1);
            }
            MouseEventKind::ScrollDown => {
                if let Some((panel, _)) = hit {
                    self.focus = panel;
                }
                self.move_highlight(1);
            }
            _ => {}
        }
        false
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn interact(&mut self, interaction: Interaction) -> bool {
        let changed = self.state.apply(interaction);
        if changed {
            debug!(?interaction, "session updated");
        }
        changed
    }

    fn move_highlight(&mut self, delta: isize) {
        let cursor = self.state.cursor(self.focus);
        self.highlight_to(cursor.saturating_add_signed(delta));
    }

    fn highlight_to(&mut self, index: usize) {
        let len = self.state.entries(self.focus).len();
        if len == 0 {
            return;
        }
        self.interact(Interaction::HighlightMoved {
            panel: self.focus,
            index: index.min(len - 1),
        });
    }

    /// Entry index under `row`, accounting for the list's scroll offset.
    fn row_at(&self, panel: PanelKind, area: Rect, row: u16) -> Option<usize> {
        let offset = match panel {
            PanelKind::Library => self.library_list_state.offset(),
            PanelKind::Instruments => self.instruments_list_state.offset(),
        };
        let index = offset + usize::from(row.checked_sub(area.y)?);
        if index < self.state.entries(panel).len() {
            Some(index)
        } else {
            warn!(panel = panel.label(), index, "click outside list rows");
            None
        }
    }

    /// Anything selected or counted.
    pub fn has_marks(&self) -> bool {
        !self.state.selected().is_empty() || self.state.tallies().values().any(|count| *count > 0)
    }

    pub fn detail_text(&self) -> String {
        project(&self.state).render_detail(&self.labels)
    }

    pub fn flash_success(&mut self, msg: impl Into<String>) {
        self.flash_message = Some((msg.into(), FlashLevel::Success));
    }

    pub fn flash_error(&mut self, msg: impl Into<String>) {
        self.flash_message = Some((msg.into(), FlashLevel::Error));
    }

    pub fn flash_info(&mut self, msg: impl Into<String>) {
        self.flash_message = Some((msg.into(), FlashLevel::Info));
    }
}
