use crate::app::App;
use crate::theme::Theme;
use bandbox_core::PanelKind;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Theme::block_dim()
        .title(format!(" {} ", app.config.ui.detail_title))
        .padding(Theme::PADDING_COMPACT);
    let color = if app.state.status(PanelKind::Library).error_message().is_some() {
        Theme::ACCENT_RED
    } else {
        Theme::TEXT_CONTENT
    };
    let paragraph = Paragraph::new(app.detail_text())
        .block(block)
        .style(Style::new().fg(color))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
