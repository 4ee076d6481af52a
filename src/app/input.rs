//! Key bindings

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions that can be taken in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Up,
    Down,
    Top,
    Bottom,
    PageUp,
    PageDown,

    // Reader paging
    NextPage,
    PrevPage,

    // Library
    Open,
    Delete,
    Add,

    Back,
    Quit,
}

/// Keys that mean the same thing everywhere
fn common_action(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    match key.code {
        KeyCode::Down => Some(Action::Down),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Home => Some(Action::Top),
        KeyCode::End => Some(Action::Bottom),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        _ => None,
    }
}

/// Vim-style keys, only active with `vim_mode`
fn vim_action(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('f') | KeyCode::Char('d') => Some(Action::PageDown),
            KeyCode::Char('b') | KeyCode::Char('u') => Some(Action::PageUp),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Char('g') => Some(Action::Top),
        KeyCode::Char('G') => Some(Action::Bottom),
        _ => None,
    }
}

/// Map a key on the library screen
pub fn library_action(key: KeyEvent, vim_mode: bool) -> Option<Action> {
    if let Some(action) = common_action(key) {
        return Some(action);
    }
    if vim_mode {
        if let Some(action) = vim_action(key) {
            return Some(action);
        }
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Enter => Some(Action::Open),
        KeyCode::Char('d') | KeyCode::Delete => Some(Action::Delete),
        KeyCode::Char('a') => Some(Action::Add),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

/// Map a key on the reader screen
pub fn reader_action(key: KeyEvent, vim_mode: bool) -> Option<Action> {
    if let Some(action) = common_action(key) {
        return Some(action);
    }
    if vim_mode {
        match key.code {
            KeyCode::Char('l') => return Some(Action::NextPage),
            KeyCode::Char('h') => return Some(Action::PrevPage),
            _ => {}
        }
        if let Some(action) = vim_action(key) {
            return Some(action);
        }
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('n') => Some(Action::NextPage),
        KeyCode::Left | KeyCode::Char('p') => Some(Action::PrevPage),
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::Back),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn vim_j_maps_to_down_only_in_vim_mode() {
        assert_eq!(library_action(key(KeyCode::Char('j')), true), Some(Action::Down));
        assert_eq!(library_action(key(KeyCode::Char('j')), false), None);
    }

    #[test]
    fn arrows_work_without_vim_mode() {
        assert_eq!(library_action(key(KeyCode::Up), false), Some(Action::Up));
        assert_eq!(reader_action(key(KeyCode::Right), false), Some(Action::NextPage));
    }

    #[test]
    fn library_commands() {
        assert_eq!(library_action(key(KeyCode::Enter), true), Some(Action::Open));
        assert_eq!(library_action(key(KeyCode::Char('d')), true), Some(Action::Delete));
        assert_eq!(library_action(key(KeyCode::Delete), false), Some(Action::Delete));
        assert_eq!(library_action(key(KeyCode::Char('a')), true), Some(Action::Add));
        assert_eq!(library_action(key(KeyCode::Char('q')), true), Some(Action::Quit));
    }

    #[test]
    fn reader_paging() {
        assert_eq!(reader_action(key(KeyCode::Char('l')), true), Some(Action::NextPage));
        assert_eq!(reader_action(key(KeyCode::Char('h')), true), Some(Action::PrevPage));
        assert_eq!(reader_action(key(KeyCode::Char('h')), false), None);
        assert_eq!(reader_action(key(KeyCode::Esc), true), Some(Action::Back));
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(library_action(ctrl_c, false), Some(Action::Quit));
        assert_eq!(reader_action(ctrl_c, true), Some(Action::Quit));
    }

    #[test]
    fn ctrl_d_pages_down_in_vim_mode() {
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(reader_action(ctrl_d, true), Some(Action::PageDown));
    }

    #[test]
    fn unknown_key_returns_none() {
        assert_eq!(library_action(key(KeyCode::Char('x')), true), None);
    }
}
