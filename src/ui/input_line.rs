//! Single-line text field

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::state::TextInput;
use crate::theme::Theme;

/// Draw `input` with a cursor when focused, or `placeholder` when empty
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    input: &TextInput,
    placeholder: &str,
    focused: bool,
    theme: &Theme,
) {
    let style = if focused {
        Style::default().fg(theme.fg_primary)
    } else {
        Style::default().fg(theme.fg_muted)
    };

    let line = if focused {
        build_line_with_cursor(&input.value, input.cursor, style, theme)
    } else if input.value.is_empty() {
        Line::from(Span::styled(placeholder.to_string(), Style::default().fg(theme.disabled)))
    } else {
        Line::from(Span::styled(input.value.clone(), style))
    };

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg_card)), area);
}

/// Split `text` around the character at `cursor` and highlight it
fn build_line_with_cursor(
    text: &str,
    cursor: usize,
    base_style: Style,
    theme: &Theme,
) -> Line<'static> {
    let at = text.char_indices().nth(cursor).map_or(text.len(), |(i, _)| i);
    let (before, rest) = text.split_at(at);
    let mut rest = rest.chars();
    let under = rest.next().unwrap_or(' ');
    let after = rest.as_str();

    let cursor_style =
        Style::default().fg(theme.bg_primary).bg(theme.fg_primary).add_modifier(Modifier::BOLD);

    let mut spans = Vec::with_capacity(3);
    if !before.is_empty() {
        spans.push(Span::styled(before.to_string(), base_style));
    }
    spans.push(Span::styled(under.to_string(), cursor_style));
    if !after.is_empty() {
        spans.push(Span::styled(after.to_string(), base_style));
    }
    Line::from(spans)
}
