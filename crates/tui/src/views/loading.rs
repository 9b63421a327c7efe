use crate::app::App;
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Splash shown until both panels have finished loading.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let ui = &app.config.ui;
    let lines = vec![
        Line::from(Span::styled(
            ui.title.clone(),
            Style::new().fg(Theme::ACCENT_ORANGE).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            ui.loading_message.clone(),
            Style::new().fg(Theme::ACCENT_BLUE).italic(),
        )),
        Line::raw(""),
        Line::from(vec![
            Span::styled("q ", Style::new().fg(Theme::TEXT_KEY)),
            Span::styled("quit", Style::new().fg(Theme::TEXT_KEY_DESC)),
        ]),
    ];

    let height = lines.len() as u16;
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height + 2),
        Constraint::Fill(1),
    ])
    .areas(area);

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Theme::block_dim());
    frame.render_widget(paragraph, middle);
}
