//! Add-book form and delete confirmation

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::{input_line, layout::centered_rect};
use crate::app::state::{AddBookForm, FormField, Modal};
use crate::theme::Theme;

const NO_FILE: &str = "No file chosen";

/// Draw the open modal over `area`, returning where it went
pub fn draw(frame: &mut Frame, area: Rect, modal: &Modal, theme: &Theme) -> Rect {
    match modal {
        Modal::None => Rect::default(),
        Modal::AddBook(form) => draw_add_book(frame, area, form, theme),
        Modal::ConfirmDelete { book, .. } => draw_confirm(frame, area, &book.title, theme),
    }
}

fn frame_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_card))
}

fn draw_add_book(frame: &mut Frame, area: Rect, form: &AddBookForm, theme: &Theme) -> Rect {
    let popup = centered_rect(60, 10, area);
    frame.render_widget(Clear, popup);

    let block = frame_block(" Add Book ", theme);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title label
            Constraint::Length(1), // title input
            Constraint::Length(1), // path label
            Constraint::Length(1), // path input
            Constraint::Length(1), // file summary
            Constraint::Min(0),
            Constraint::Length(1), // hints
        ])
        .split(inner);

    let label = |text: &'static str, focused: bool| {
        let style = if focused {
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg_muted)
        };
        Paragraph::new(Span::styled(text, style))
    };

    let title_focused = form.focus == FormField::Title;
    frame.render_widget(label("Title", title_focused), rows[0]);
    input_line::draw(frame, rows[1], &form.title, "Book title", title_focused, theme);
    frame.render_widget(label("File", !title_focused), rows[2]);
    input_line::draw(frame, rows[3], &form.path, "/path/to/book.epub", !title_focused, theme);

    let summary = match form.file_summary() {
        Some((name, media_type)) if media_type.is_supported() => Line::from(vec![
            Span::styled(name, Style::default().fg(theme.fg_primary)),
            Span::styled(
                format!(" · {}", media_type.label().to_uppercase()),
                Style::default().fg(theme.success),
            ),
        ]),
        Some((name, _)) => Line::from(vec![
            Span::styled(name, Style::default().fg(theme.fg_primary)),
            Span::styled(" · unsupported format", Style::default().fg(theme.error)),
        ]),
        None => Line::from(Span::styled(NO_FILE, Style::default().fg(theme.fg_muted))),
    };
    frame.render_widget(Paragraph::new(summary), rows[4]);

    let hints = Paragraph::new("Tab switch field · Enter add · Esc cancel")
        .style(Style::default().fg(theme.fg_muted))
        .alignment(Alignment::Center);
    frame.render_widget(hints, rows[6]);

    popup
}

fn draw_confirm(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) -> Rect {
    let popup = centered_rect(50, 6, area);
    frame.render_widget(Clear, popup);

    let block = frame_block(" Delete Book ", theme);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let text = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(format!("\"{title}\""), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("?"),
        ]),
        Line::default(),
        Line::from(Span::styled("y delete · n keep", Style::default().fg(theme.fg_muted))),
    ];
    let body = Paragraph::new(text)
        .style(Style::default().fg(theme.fg_primary))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, inner);

    popup
}
