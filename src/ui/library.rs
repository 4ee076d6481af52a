//! Book list screen

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::state::LibraryViewState;
use crate::library::BookRecord;
use crate::theme::Theme;

/// Rows taken by one card, borders included
pub const CARD_HEIGHT: u16 = 3;

/// Columns at a card's right edge that belong to its delete button
const DELETE_ZONE_WIDTH: u16 = 5;

const EMPTY_MESSAGE: &str = "No books yet. Press a to add your first one!";

/// What a click on the list landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardHit {
    Activate(usize),
    Delete(usize),
}

/// Resolve a click to exactly one card action
pub fn hit_test(view: &LibraryViewState, len: usize, column: u16, row: u16) -> Option<CardHit> {
    let area = view.list_area;
    if !area.contains(Position::new(column, row)) {
        return None;
    }

    let slot = usize::from((row - area.y) / CARD_HEIGHT);
    if slot >= view.visible_cards {
        return None;
    }
    let index = view.scroll_offset + slot;
    if index >= len {
        return None;
    }

    if column >= area.right().saturating_sub(DELETE_ZONE_WIDTH) {
        Some(CardHit::Delete(index))
    } else {
        Some(CardHit::Activate(index))
    }
}

/// Draw the shelf into `area`
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    view: &mut LibraryViewState,
    books: &[BookRecord],
    theme: &Theme,
) {
    let count = match books.len() {
        1 => " 1 book ".to_string(),
        n => format!(" {n} books "),
    };
    let block = Block::default()
        .title(" Tusach ")
        .title_bottom(Line::from(count).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Update metrics used for scrolling and hit testing
    view.list_area = inner;
    view.visible_cards = usize::from(inner.height / CARD_HEIGHT);
    view.clamp(books.len());

    if books.is_empty() {
        draw_empty(frame, inner, theme);
        return;
    }

    let visible = books.iter().enumerate().skip(view.scroll_offset).take(view.visible_cards);
    for (slot, (index, book)) in visible.enumerate() {
        let card = Rect {
            x: inner.x,
            y: inner.y + slot as u16 * CARD_HEIGHT,
            width: inner.width,
            height: CARD_HEIGHT,
        };
        draw_card(frame, card, book, index == view.selected, theme);
    }
}

fn draw_empty(frame: &mut Frame, area: Rect, theme: &Theme) {
    let top = area.y + area.height / 2;
    let line = Rect { y: top.min(area.bottom().saturating_sub(1)), height: 1.min(area.height), ..area };
    let msg = Paragraph::new(EMPTY_MESSAGE)
        .style(Style::default().fg(theme.fg_muted))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(msg, line);
}

fn draw_card(frame: &mut Frame, area: Rect, book: &BookRecord, selected: bool, theme: &Theme) {
    let (border, bg) = if selected {
        (theme.border_focused, theme.selection)
    } else {
        (theme.border, theme.bg_card)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let meta = format!("{} · {} ", book.media_type.label().to_uppercase(), human_size(book.size_hint()));
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(meta.chars().count() as u16),
            Constraint::Length(DELETE_ZONE_WIDTH - 2),
        ])
        .split(inner);

    let title_style = if selected {
        Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg_primary)
    };
    let marker = if selected { "▸ " } else { "  " };
    let title = Line::from(vec![
        Span::styled(marker, Style::default().fg(theme.accent_primary)),
        Span::styled(book.title.clone(), title_style),
    ]);
    frame.render_widget(Paragraph::new(title), chunks[0]);

    let meta_style = if book.media_type.is_supported() {
        Style::default().fg(theme.fg_muted)
    } else {
        Style::default().fg(theme.error)
    };
    frame.render_widget(Paragraph::new(Span::styled(meta, meta_style)), chunks[1]);

    let delete = Paragraph::new(Span::styled("×", Style::default().fg(theme.error)))
        .alignment(Alignment::Center);
    frame.render_widget(delete, chunks[2]);
}

/// Human readable byte count
pub fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 { format!("{bytes} B") } else { format!("{size:.1} {}", UNITS[unit]) }
}
