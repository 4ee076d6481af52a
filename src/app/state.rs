//! Application state definitions

use std::path::Path;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::library::{BookRecord, MediaType};
use crate::reader::Viewport;

/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Which screen is currently displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Library,
    Reader,
}

/// Selection and scroll state for the book list
#[derive(Debug, Clone, Default)]
pub struct LibraryViewState {
    /// Currently selected card
    pub selected: usize,
    /// Index of the first visible card
    pub scroll_offset: usize,
    /// Cards that fit on screen (updated on render)
    pub visible_cards: usize,
    /// Where the cards were last drawn (updated on render)
    pub list_area: Rect,
}

impl LibraryViewState {
    /// Ensure the selected card is visible by adjusting scroll offset
    pub fn ensure_selection_visible(&mut self) {
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        }
        if self.visible_cards > 0 && self.selected >= self.scroll_offset + self.visible_cards {
            self.scroll_offset = self.selected + 1 - self.visible_cards;
        }
    }

    /// Keep selection and scroll inside a list of `len` cards
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.scroll_offset = self.scroll_offset.min(self.selected);
        self.ensure_selection_visible();
    }

    pub fn select_next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
        self.ensure_selection_visible();
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.ensure_selection_visible();
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.ensure_selection_visible();
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
        self.ensure_selection_visible();
    }

    pub fn page_down(&mut self, len: usize) {
        let step = self.visible_cards.max(1);
        self.selected = (self.selected + step).min(len.saturating_sub(1));
        self.ensure_selection_visible();
    }

    pub fn page_up(&mut self) {
        let step = self.visible_cards.max(1);
        self.selected = self.selected.saturating_sub(step);
        self.ensure_selection_visible();
    }
}

/// Scroll state for the reader surface
#[derive(Debug, Clone, Default)]
pub struct ReaderViewState {
    /// Current scroll position (lines from top of the PDF page)
    pub scroll_offset: usize,
    /// Total rendered lines (updated on render)
    pub total_lines: usize,
    /// Visible height in lines (updated on render)
    pub visible_height: usize,
    /// Size of the page surface, kept in step with the terminal
    pub viewport: Viewport,
}

impl ReaderViewState {
    /// Get the maximum allowed scroll offset
    pub fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_height)
    }

    /// Clamp scroll offset to valid range
    pub fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
        self.clamp_scroll();
    }
}

/// Single-line editable text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    /// Cursor position, in characters
    pub cursor: usize,
}

impl TextInput {
    /// Convert character index to byte index
    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.value.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(self.value.len())
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at cursor
    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self.char_to_byte_index(self.cursor);
        self.value.insert(byte_idx, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.value.remove(byte_idx);
        }
    }

    /// Delete character at cursor
    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.char_count() {
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.value.remove(byte_idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }
}

/// Field of the add-book form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormField {
    #[default]
    Title,
    Path,
}

/// The add-book form
#[derive(Debug, Clone, Default)]
pub struct AddBookForm {
    pub title: TextInput,
    pub path: TextInput,
    pub focus: FormField,
}

impl AddBookForm {
    pub fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Path => &mut self.path,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FormField::Title => FormField::Path,
            FormField::Path => FormField::Title,
        };
    }

    /// File name and detected format of the chosen path, for display
    pub fn file_summary(&self) -> Option<(String, MediaType)> {
        let path = Path::new(self.path.value.trim());
        let name = path.file_name()?.to_string_lossy().into_owned();
        Some((name, MediaType::from_path(path)))
    }
}

/// Overlay on top of the library
#[derive(Debug, Clone, Default)]
pub enum Modal {
    #[default]
    None,
    AddBook(AddBookForm),
    /// Remembers which book was named in the prompt
    ConfirmDelete { index: usize, book: BookRecord },
}

impl Modal {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// Transient notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self { message: message.into(), kind, shown_at: Instant::now() }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= TOAST_DURATION
    }
}

/// Full application state
#[derive(Debug, Default)]
pub struct AppState {
    /// Current screen
    pub screen: Screen,

    /// Book list state
    pub library: LibraryViewState,

    /// Reader surface state
    pub reader: ReaderViewState,

    /// Open modal, if any
    pub modal: Modal,

    /// Where the open modal was last drawn (updated on render)
    pub modal_area: Rect,

    /// Toast currently shown
    pub toast: Option<Toast>,
}
