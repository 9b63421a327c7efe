pub mod details;
pub mod instruments;
pub mod library;
pub mod loading;
pub mod modal;

use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, HighlightSpacing, List, ListItem, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Columns taken by the list highlight symbol.
const HIGHLIGHT_SYMBOL: &str = " > ";

/// Shorten `text` to at most `max_width` terminal columns, marking the cut
/// with `…`.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Width left for an entry name after the highlight symbol and `marker`.
fn name_width(inner: Rect, marker: &str) -> usize {
    usize::from(inner.width)
        .saturating_sub(HIGHLIGHT_SYMBOL.len())
        .saturating_sub(UnicodeWidthStr::width(marker))
}

/// Panel body for any non-list state (loading, error, empty).
fn render_message(frame: &mut Frame, area: Rect, block: Block<'static>, text: String, color: Color) {
    let paragraph = Paragraph::new(text)
        .block(block.padding(Theme::PADDING_COMPACT))
        .style(Style::new().fg(color))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn entry_list(items: Vec<ListItem<'static>>, block: Block<'static>) -> List<'static> {
    List::new(items)
        .block(block)
        .highlight_style(
            Style::new()
                .bg(Theme::BG_SURFACE)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_spacing(HighlightSpacing::Always)
}
