use crate::app::App;
use crate::theme::Theme;
use bandbox_core::{PanelKind, PanelStatus};
use ratatui::prelude::*;
use ratatui::widgets::ListItem;

use super::{entry_list, name_width, render_message, truncate_to_width};

const MARK_ON: &str = "[x] ";
const MARK_OFF: &str = "[ ] ";

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.focus == PanelKind::Library;
    let ui = &app.config.ui;
    let selected = app.state.selected().len();
    let title = if selected > 0 {
        format!(" {} ({} selected) ", ui.library_title, selected)
    } else {
        format!(" {} ", ui.library_title)
    };
    let block = Theme::panel(focused).title(title);

    match app.state.status(PanelKind::Library) {
        PanelStatus::Loading => {
            app.panel_areas.library = Rect::default();
            render_message(frame, area, block, ui.library_placeholder.clone(), Theme::TEXT_MUTED);
            return;
        }
        PanelStatus::Error(message) => {
            app.panel_areas.library = Rect::default();
            render_message(
                frame,
                area,
                block,
                format!("Unable to load library:\n{message}"),
                Theme::ACCENT_RED,
            );
            return;
        }
        PanelStatus::Ready => {}
    }

    if app.state.entries(PanelKind::Library).is_empty() {
        app.panel_areas.library = Rect::default();
        render_message(frame, area, block, ui.library_empty_message.clone(), Theme::TEXT_MUTED);
        return;
    }

    let inner = block.inner(area);
    let width = name_width(inner, MARK_OFF);
    let items: Vec<ListItem<'static>> = app
        .state
        .library_rows()
        .into_iter()
        .map(|row| {
            let (marker, marker_color) = if row.selected {
                (MARK_ON, Theme::MARK_SELECTED)
            } else {
                (MARK_OFF, Theme::MARK_IDLE)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::new().fg(marker_color)),
                Span::styled(
                    truncate_to_width(row.identity, width),
                    Style::new().fg(Theme::TEXT_PRIMARY),
                ),
            ]))
        })
        .collect();

    app.panel_areas.library = inner;
    app.library_list_state
        .select(Some(app.state.cursor(PanelKind::Library)));
    frame.render_stateful_widget(entry_list(items, block), area, &mut app.library_list_state);
}
