//! UI rendering components

pub mod input_line;
pub mod layout;
pub mod library;
pub mod modal;
pub mod reader;
pub mod status_line;

use ratatui::Frame;

use crate::app::state::{AppState, Screen};
use crate::library::BookRecord;
use crate::reader::ReaderSession;
use crate::theme::Theme;

/// Main draw function
pub fn draw(
    frame: &mut Frame,
    state: &mut AppState,
    books: &[BookRecord],
    session: &ReaderSession,
    theme: &Theme,
) {
    let (main, status) = layout::main_and_status(frame.area());

    match state.screen {
        Screen::Library => library::draw(frame, main, &mut state.library, books, theme),
        Screen::Reader => reader::draw(frame, main, &mut state.reader, session, theme),
    }

    state.modal_area = modal::draw(frame, frame.area(), &state.modal, theme);
    status_line::draw(frame, status, state, theme);
}
