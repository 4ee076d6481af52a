//! Bottom status bar: the current toast, or key hints

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::state::{AppState, Modal, Screen, ToastKind};
use crate::theme::Theme;

/// Draw the status bar
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let line = match &state.toast {
        Some(toast) => {
            let (icon, color) = match toast.kind {
                ToastKind::Success => ("✓", theme.success),
                ToastKind::Error => ("✗", theme.error),
                ToastKind::Info => ("•", theme.info),
            };
            Line::from(vec![
                Span::styled(format!(" {icon} "), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(toast.message.clone(), Style::default().fg(color)),
            ])
        }
        None => Line::from(Span::styled(
            format!(" {}", hints(state)),
            Style::default().fg(theme.fg_muted),
        )),
    };

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg_primary)), area);
}

fn hints(state: &AppState) -> &'static str {
    match (&state.modal, state.screen) {
        (Modal::AddBook(_), _) | (Modal::ConfirmDelete { .. }, _) => "",
        (Modal::None, Screen::Library) => "a add · enter open · d delete · q quit",
        (Modal::None, Screen::Reader) => "←/→ page · ↑/↓ scroll · esc back to shelf",
    }
}
