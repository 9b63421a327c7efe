use crate::app::App;
use crate::theme::Theme;
use bandbox_core::{PanelKind, PanelStatus};
use ratatui::prelude::*;
use ratatui::widgets::ListItem;

use super::{entry_list, name_width, render_message, truncate_to_width};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.focus == PanelKind::Instruments;
    let ui = &app.config.ui;
    let block = Theme::panel(focused).title(format!(" {} ", ui.instruments_title));

    match app.state.status(PanelKind::Instruments) {
        PanelStatus::Loading => {
            app.panel_areas.instruments = Rect::default();
            render_message(
                frame,
                area,
                block,
                ui.instruments_placeholder.clone(),
                Theme::TEXT_MUTED,
            );
            return;
        }
        PanelStatus::Error(message) => {
            app.panel_areas.instruments = Rect::default();
            render_message(
                frame,
                area,
                block,
                format!("Unable to load instruments:\n{message}"),
                Theme::ACCENT_RED,
            );
            return;
        }
        PanelStatus::Ready => {}
    }

    if app.state.entries(PanelKind::Instruments).is_empty() {
        app.panel_areas.instruments = Rect::default();
        render_message(
            frame,
            area,
            block,
            ui.instruments_empty_message.clone(),
            Theme::TEXT_MUTED,
        );
        return;
    }

    let inner = block.inner(area);
    let rows = app.state.instrument_rows();
    let widest_marker = rows
        .iter()
        .map(|row| format!("[{}] ", row.count).len())
        .max()
        .unwrap_or(4);
    let width = name_width(inner, &" ".repeat(widest_marker));
    let items: Vec<ListItem<'static>> = rows
        .into_iter()
        .map(|row| {
            let marker_color = if row.count > 0 {
                Theme::COUNT_ACTIVE
            } else {
                Theme::MARK_IDLE
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", row.count), Style::new().fg(marker_color)),
                Span::styled(
                    truncate_to_width(row.identity, width),
                    Style::new().fg(Theme::TEXT_PRIMARY),
                ),
            ]))
        })
        .collect();

    app.panel_areas.instruments = inner;
    app.instruments_list_state
        .select(Some(app.state.cursor(PanelKind::Instruments)));
    frame.render_stateful_widget(
        entry_list(items, block),
        area,
        &mut app.instruments_list_state,
    );
}
