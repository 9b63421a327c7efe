use crate::app::{App, FlashLevel, PanelAreas};
use crate::theme::Theme;
use crate::views::{details, instruments, library, loading, modal};
use bandbox_core::PanelKind;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, app: &mut App) {
    // Splash is full-screen until both panels settle
    if app.state.is_loading() {
        app.panel_areas = PanelAreas::default();
        loading::render(frame, app, frame.area());
        if let Some(ref m) = app.modal {
            modal::render(frame, m);
        }
        return;
    }

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [library_area, right_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(body_area);
    let [detail_area, instruments_area] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(right_area);

    render_header(frame, app, header_area);
    library::render(frame, app, library_area);
    details::render(frame, app, detail_area);
    instruments::render(frame, app, instruments_area);
    render_footer(frame, app, footer_area);

    // Modal overlay
    if let Some(ref m) = app.modal {
        modal::render(frame, m);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Theme::block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let ui = &app.config.ui;
    let start_span = if app.is_starting() {
        Span::styled(
            ui.start_running_label.clone(),
            Style::new().fg(Theme::ACCENT_YELLOW).italic(),
        )
    } else {
        Span::styled(ui.start_label.clone(), Style::new().fg(Theme::ACCENT_GREEN))
    };

    let counted = app
        .state
        .tallies()
        .values()
        .filter(|count| **count > 0)
        .count();
    let spans = vec![
        Span::styled(format!(" {} ", ui.title), Style::new().fg(Theme::ACCENT_ORANGE).bold()),
        Span::styled("  ", Style::new()),
        start_span,
        Span::styled("  ", Style::new()),
        Span::styled(
            format!(
                "{} selected  {} counted",
                app.state.selected().len(),
                counted
            ),
            Style::new().fg(Theme::TEXT_SECONDARY),
        ),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::new().fg(Theme::TEXT_KEY);
    let desc_style = Style::new().fg(Theme::TEXT_KEY_DESC);

    let mut spans = vec![
        Span::styled(" Tab ", key_style),
        Span::styled("panel  ", desc_style),
        Span::styled("j/k ", key_style),
        Span::styled("move  ", desc_style),
    ];
    match app.focus {
        PanelKind::Library => {
            spans.push(Span::styled("Space ", key_style));
            spans.push(Span::styled("select  ", desc_style));
        }
        PanelKind::Instruments => {
            spans.push(Span::styled("Space/+ ", key_style));
            spans.push(Span::styled("add  ", desc_style));
            spans.push(Span::styled("-/Bksp ", key_style));
            spans.push(Span::styled("remove  ", desc_style));
        }
    }
    spans.extend([
        Span::styled("u ", key_style),
        Span::styled("undo  ", desc_style),
        Span::styled("c ", key_style),
        Span::styled("clear  ", desc_style),
        Span::styled("s ", key_style),
        Span::styled("start  ", desc_style),
        Span::styled("r ", key_style),
        Span::styled("reload  ", desc_style),
        Span::styled("q ", key_style),
        Span::styled("quit", desc_style),
    ]);

    // Append flash message to the footer
    if let Some((ref msg, level)) = app.flash_message {
        let color = match level {
            FlashLevel::Success => Theme::ACCENT_GREEN,
            FlashLevel::Error => Theme::ACCENT_RED,
            FlashLevel::Info => Theme::ACCENT_BLUE,
        };
        spans.push(Span::styled("  ", Style::new()));
        spans.push(Span::styled(msg.as_str(), Style::new().fg(color)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
