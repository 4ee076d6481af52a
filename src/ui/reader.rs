//! Reader screen: the page surface and its navigation bar

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::layout::main_and_status;
use crate::app::state::ReaderViewState;
use crate::reader::epub::{SPREAD_GUTTER, SPREAD_MIN_WIDTH};
use crate::reader::{ActiveFormat, ReaderSession, Surface, Viewport};
use crate::theme::Theme;

/// Regions of the reader screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderAreas {
    pub surface: Rect,
    pub nav: Rect,
}

fn frame_block(title: String, theme: &Theme) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg_primary))
}

/// Split the inside of the reader frame into surface and navigation bar
pub fn areas(inner: Rect) -> ReaderAreas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    ReaderAreas { surface: chunks[0], nav: chunks[1] }
}

/// Size of the page surface for a terminal of `screen` size
pub fn surface_viewport(screen: Rect) -> Viewport {
    let (main, _) = main_and_status(screen);
    let inner = Block::default().borders(Borders::ALL).inner(main);
    let surface = areas(inner).surface;
    Viewport { width: surface.width, height: surface.height }
}

/// Draw the reader into `area`
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    view: &mut ReaderViewState,
    session: &ReaderSession,
    theme: &Theme,
) {
    let title = session.title().map(|t| format!(" {t} ")).unwrap_or_default();
    let block = frame_block(title, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let ReaderAreas { surface, nav } = areas(inner);

    let rendering = match session.surface() {
        Surface::Hidden => false,
        Surface::Loading { format } => {
            draw_loading(frame, surface, format, theme);
            false
        }
        Surface::Epub(pages) => {
            draw_epub(frame, surface, &pages, theme);
            false
        }
        Surface::Pdf { page, rendered } => match rendered {
            Some(rendered) => {
                view.total_lines = rendered.lines.len();
                view.visible_height = usize::from(surface.height);
                view.clamp_scroll();
                draw_pdf_page(frame, surface, &rendered.lines, rendered.width, view.scroll_offset, theme);
                rendered.number != page
            }
            None => true,
        },
    };

    draw_nav(frame, nav, session, rendering, theme);
}

fn draw_loading(frame: &mut Frame, area: Rect, format: ActiveFormat, theme: &Theme) {
    let what = match format {
        ActiveFormat::Epub => "EPUB",
        ActiveFormat::Pdf => "PDF",
        ActiveFormat::None => "book",
    };
    let row = Rect { y: area.y + area.height / 2, height: 1.min(area.height), ..area };
    let msg = Paragraph::new(format!("Opening {what}…"))
        .style(Style::default().fg(theme.fg_muted))
        .alignment(Alignment::Center);
    frame.render_widget(msg, row);
}

fn page_paragraph(lines: &[String], theme: &Theme) -> Paragraph<'static> {
    let lines: Vec<Line> = lines.iter().map(|l| Line::from(l.clone())).collect();
    Paragraph::new(lines).style(Style::default().fg(theme.fg_page).bg(theme.bg_page))
}

fn draw_epub(frame: &mut Frame, area: Rect, pages: &[Vec<String>], theme: &Theme) {
    let columns: Vec<Rect> = if area.width >= SPREAD_MIN_WIDTH {
        let width = area.width.saturating_sub(SPREAD_GUTTER) / 2;
        vec![
            Rect { width, ..area },
            Rect { x: area.x + width + SPREAD_GUTTER, width, ..area },
        ]
    } else {
        vec![area]
    };

    for (column, page) in columns.iter().zip(pages) {
        frame.render_widget(page_paragraph(page, theme), *column);
    }
}

fn draw_pdf_page(
    frame: &mut Frame,
    area: Rect,
    lines: &[String],
    width: u16,
    scroll: usize,
    theme: &Theme,
) {
    let width = width.min(area.width);
    let page = Rect { x: area.x + (area.width - width) / 2, width, ..area };
    let visible: Vec<String> =
        lines.iter().skip(scroll).take(usize::from(area.height)).cloned().collect();
    frame.render_widget(page_paragraph(&visible, theme), page);
}

fn draw_nav(frame: &mut Frame, area: Rect, session: &ReaderSession, rendering: bool, theme: &Theme) {
    let affordance = |label: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.disabled)
        };
        Paragraph::new(Span::styled(label, style))
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(8), Constraint::Min(1), Constraint::Length(8)])
        .split(area);

    frame.render_widget(affordance(" ‹ Prev", session.can_prev()), chunks[0]);

    let mut indicator = session.page_indicator().unwrap_or_default();
    if rendering {
        indicator.push_str(" · rendering…");
    }
    let indicator = Paragraph::new(indicator)
        .style(Style::default().fg(theme.fg_muted))
        .alignment(Alignment::Center);
    frame.render_widget(indicator, chunks[1]);

    frame.render_widget(
        affordance("Next › ", session.can_next()).alignment(Alignment::Right),
        chunks[2],
    );
}
