//! Layout utilities

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Split the screen into the main area and the one-line status bar
pub fn main_and_status(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// A rect `percent_x` wide and `height` rows tall, centered in `area`
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (area.width as u32 * percent_x.min(100) as u32 / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bar_is_last_row() {
        let (main, status) = main_and_status(Rect::new(0, 0, 80, 24));
        assert_eq!(main.height, 23);
        assert_eq!(status, Rect::new(0, 23, 80, 1));
    }

    #[test]
    fn centered_rect_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 20);
        assert_eq!(centered_rect(60, 8, area), Rect::new(20, 6, 60, 8));
        assert_eq!(centered_rect(60, 40, area).height, 20);
    }
}
