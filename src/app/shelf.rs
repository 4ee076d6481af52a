//! Screen-independent application logic
//!
//! [`Shelf`] owns the library store, the reader session and the UI state. It
//! turns keys, clicks and renderer completions into state changes and toasts;
//! the terminal loop in [`super::App`] only feeds it events and draws.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use directories::BaseDirs;
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use tracing::{debug, info, warn};

use super::input::{Action, library_action, reader_action};
use super::state::{AddBookForm, AppState, Modal, Screen, Toast, ToastKind};
use crate::config::Config;
use crate::library::{LibraryStore, MediaType};
use crate::reader::{ActiveFormat, ReaderSession, SessionUpdate};
use crate::storage::KeyValueStore;
use crate::ui::{self, library::CardHit};

/// Lines scrolled per mouse wheel notch
const WHEEL_STEP: isize = 3;

/// Whether the app should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The bookshelf: library, reader and the state that ties them to the screen
pub struct Shelf<S> {
    state: AppState,
    library: LibraryStore<S>,
    session: ReaderSession,
    config: Config,
}

impl<S: KeyValueStore> Shelf<S> {
    pub fn new(library: LibraryStore<S>, session: ReaderSession, config: Config) -> Self {
        Self { state: AppState::default(), library, session, config }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn library(&self) -> &LibraryStore<S> {
        &self.library
    }

    pub fn session(&self) -> &ReaderSession {
        &self.session
    }

    /// Render the current screen
    pub fn draw(&mut self, frame: &mut Frame) {
        let theme = self.config.active_theme();
        ui::draw(frame, &mut self.state, self.library.list(), &self.session, &theme);
    }

    /// Terminal resized to `width` x `height`
    pub fn resize(&mut self, width: u16, height: u16) {
        let viewport = ui::reader::surface_viewport(Rect::new(0, 0, width, height));
        self.state.reader.viewport = viewport;
        self.session.resize(viewport);
    }

    /// Apply renderer completions and expire the toast
    pub fn tick(&mut self, now: Instant) {
        for update in self.session.poll_events() {
            match update {
                SessionUpdate::Opened { title } => debug!("Reader showing {:?}", title),
                SessionUpdate::Moved => {}
                SessionUpdate::Failed(error) => {
                    let message = if self.session.active_format() == ActiveFormat::None {
                        format!("Could not open book: {error}")
                    } else {
                        format!("Could not render page: {error}")
                    };
                    self.toast(ToastKind::Error, message);
                }
            }
        }

        if self.state.screen == Screen::Reader
            && self.session.active_format() == ActiveFormat::None
        {
            self.state.screen = Screen::Library;
        }

        if self.state.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.state.toast = None;
        }
    }

    /// Handle a key press
    pub async fn handle_key(&mut self, key: KeyEvent) -> Control {
        match self.state.modal {
            Modal::AddBook(_) => {
                self.handle_form_key(key).await;
                return Control::Continue;
            }
            Modal::ConfirmDelete { .. } => {
                self.handle_confirm_key(key);
                return Control::Continue;
            }
            Modal::None => {}
        }

        match self.state.screen {
            Screen::Library => self.handle_library_key(key),
            Screen::Reader => self.handle_reader_key(key),
        }
    }

    /// Handle a mouse event
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Control {
        if self.state.modal.is_open() {
            // Clicking outside the add form dismisses it
            let outside = !self.state.modal_area.contains(Position::new(mouse.column, mouse.row));
            if matches!(self.state.modal, Modal::AddBook(_))
                && mouse.kind == MouseEventKind::Down(MouseButton::Left)
                && outside
            {
                self.state.modal = Modal::None;
            }
            return Control::Continue;
        }

        match (self.state.screen, mouse.kind) {
            (Screen::Library, MouseEventKind::Down(MouseButton::Left)) => {
                let hit = ui::library::hit_test(
                    &self.state.library,
                    self.library.len(),
                    mouse.column,
                    mouse.row,
                );
                match hit {
                    Some(CardHit::Activate(index)) => self.activate(index),
                    Some(CardHit::Delete(index)) => self.request_delete(index),
                    None => {}
                }
            }
            (Screen::Library, MouseEventKind::ScrollDown) => {
                self.state.library.select_next(self.library.len());
            }
            (Screen::Library, MouseEventKind::ScrollUp) => self.state.library.select_prev(),
            (Screen::Reader, MouseEventKind::ScrollDown) => self.state.reader.scroll_by(WHEEL_STEP),
            (Screen::Reader, MouseEventKind::ScrollUp) => self.state.reader.scroll_by(-WHEEL_STEP),
            _ => {}
        }
        Control::Continue
    }

    fn handle_library_key(&mut self, key: KeyEvent) -> Control {
        let len = self.library.len();
        let view = &mut self.state.library;
        match library_action(key, self.config.vim_mode) {
            Some(Action::Down) => view.select_next(len),
            Some(Action::Up) => view.select_prev(),
            Some(Action::Top) => view.select_first(),
            Some(Action::Bottom) => view.select_last(len),
            Some(Action::PageDown) => view.page_down(len),
            Some(Action::PageUp) => view.page_up(),
            Some(Action::Open) => self.activate(self.state.library.selected),
            Some(Action::Delete) => self.request_delete(self.state.library.selected),
            Some(Action::Add) => self.state.modal = Modal::AddBook(AddBookForm::default()),
            Some(Action::Quit) => return Control::Quit,
            _ => {}
        }
        Control::Continue
    }

    fn handle_reader_key(&mut self, key: KeyEvent) -> Control {
        let epub = self.session.active_format() == ActiveFormat::Epub;
        match reader_action(key, self.config.vim_mode) {
            Some(Action::NextPage) => self.turn_page(true),
            Some(Action::PrevPage) => self.turn_page(false),
            Some(Action::PageDown) if epub => self.turn_page(true),
            Some(Action::PageUp) if epub => self.turn_page(false),
            Some(Action::Down) => self.state.reader.scroll_by(1),
            Some(Action::Up) => self.state.reader.scroll_by(-1),
            Some(Action::PageDown) => {
                let page = self.state.reader.visible_height.max(1) as isize;
                self.state.reader.scroll_by(page);
            }
            Some(Action::PageUp) => {
                let page = self.state.reader.visible_height.max(1) as isize;
                self.state.reader.scroll_by(-page);
            }
            Some(Action::Top) => self.state.reader.scroll_offset = 0,
            Some(Action::Bottom) => {
                self.state.reader.scroll_offset = self.state.reader.max_scroll();
            }
            Some(Action::Back) => self.close_reader(),
            Some(Action::Quit) => return Control::Quit,
            _ => {}
        }
        Control::Continue
    }

    fn turn_page(&mut self, forward: bool) {
        let moved = if forward { self.session.next() } else { self.session.prev() };
        if moved {
            self.state.reader.scroll_offset = 0;
        }
    }

    async fn handle_form_key(&mut self, key: KeyEvent) {
        let Modal::AddBook(form) = &mut self.state.modal else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.modal = Modal::None,
            KeyCode::Enter => self.submit_add_form().await,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_focus(),
            KeyCode::Backspace => form.focused_mut().delete_char(),
            KeyCode::Delete => form.focused_mut().delete_char_forward(),
            KeyCode::Left => form.focused_mut().move_left(),
            KeyCode::Right => form.focused_mut().move_right(),
            KeyCode::Home => form.focused_mut().move_start(),
            KeyCode::End => form.focused_mut().move_end(),
            KeyCode::Char(c) => form.focused_mut().insert_char(c),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.cancel_delete(),
            _ => {}
        }
    }

    /// Dismiss the confirmation, keeping the book
    pub fn cancel_delete(&mut self) {
        if let Modal::ConfirmDelete { book, .. } = std::mem::take(&mut self.state.modal) {
            self.toast(ToastKind::Info, format!("Kept \"{}\"", book.title));
        }
    }

    /// Read the chosen file and add it; incomplete forms are ignored
    pub async fn submit_add_form(&mut self) {
        let Modal::AddBook(form) = &self.state.modal else {
            return;
        };
        let title = form.title.value.trim().to_string();
        let path = form.path.value.trim().to_string();
        if title.is_empty() || path.is_empty() {
            debug!("Ignoring incomplete add-book form");
            return;
        }

        let path = expand_home(&path);
        let media_type = MediaType::from_path(&path);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Could not read {:?}: {}", path, e);
                self.toast(ToastKind::Error, format!("Could not read {}: {}", path.display(), e));
                return;
            }
        };

        self.refresh_library();
        let added = self.library.add(&title, &bytes, media_type).map(|b| b.title.clone());
        match added {
            Ok(title) => {
                self.state.modal = Modal::None;
                self.state.library.select_last(self.library.len());
                self.toast(ToastKind::Success, format!("Added \"{title}\""));
            }
            Err(e) => {
                warn!("Could not add {:?}: {}", title, e);
                self.toast(ToastKind::Error, format!("Could not add \"{title}\": {e}"));
            }
        }
    }

    /// Open the book at `index` in the reader
    pub fn activate(&mut self, index: usize) {
        let Some(record) = self.library.get(index) else {
            return;
        };
        self.state.library.selected = index;
        self.state.library.ensure_selection_visible();

        let title = record.title.clone();
        match self.session.open(record, self.state.reader.viewport) {
            Ok(()) => {
                info!("Opening {:?}", title);
                self.state.screen = Screen::Reader;
                self.state.reader.scroll_offset = 0;
            }
            Err(e) => {
                warn!("Could not open {:?}: {}", title, e);
                self.toast(ToastKind::Error, format!("Could not open \"{title}\": {e}"));
            }
        }
    }

    /// Ask before deleting the book at `index`
    pub fn request_delete(&mut self, index: usize) {
        if let Some(book) = self.library.get(index) {
            self.state.modal = Modal::ConfirmDelete { index, book: book.clone() };
        }
    }

    /// Delete the book named in the confirmation, if it is still where it was
    pub fn confirm_delete(&mut self) {
        let Modal::ConfirmDelete { index, book } = std::mem::take(&mut self.state.modal) else {
            return;
        };
        self.refresh_library();
        // Titles may repeat, so the whole record has to match
        let still_there = self.library.get(index) == Some(&book);
        let title = book.title;
        if !still_there {
            warn!("Library changed before deleting {:?} at {}", title, index);
            self.toast(ToastKind::Error, format!("\"{title}\" has moved; nothing was deleted"));
            return;
        }

        match self.library.remove(index) {
            Ok(removed) => {
                self.state.library.clamp(self.library.len());
                self.toast(ToastKind::Success, format!("Deleted \"{}\"", removed.title));
            }
            Err(e) => {
                warn!("Could not delete {:?}: {}", title, e);
                self.toast(ToastKind::Error, format!("Could not delete \"{title}\": {e}"));
            }
        }
    }

    /// Pick up library changes made outside the TUI, such as a CLI `add`
    fn refresh_library(&mut self) {
        self.library.reload();
        self.state.library.clamp(self.library.len());
    }

    /// Leave the reader, releasing the renderer
    pub fn close_reader(&mut self) {
        self.session.close();
        self.state.screen = Screen::Library;
        self.state.reader.scroll_offset = 0;
    }

    fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.state.toast = Some(Toast::new(kind, message));
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{BookRecord, LIBRARY_KEY};
    use crate::reader::testing::{FAKE_PDF_PAGES, FakeEpubEngine, fake_renderers};
    use crate::reader::Position as ReaderPosition;
    use crate::storage::{FileStore, MemoryStore};
    use crossterm::event::{KeyModifiers, MouseEvent};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn shelf_with(storage: MemoryStore) -> Shelf<MemoryStore> {
        let library = LibraryStore::load(storage);
        let session = ReaderSession::new(fake_renderers(FakeEpubEngine::default()));
        Shelf::new(library, session, Config::default())
    }

    fn shelf(titles: &[&str]) -> Shelf<MemoryStore> {
        let mut shelf = shelf_with(MemoryStore::new());
        for title in titles {
            shelf.library.add(title, b"%PDF", MediaType::Pdf).unwrap();
        }
        shelf
    }

    fn titles(shelf: &Shelf<MemoryStore>) -> Vec<String> {
        shelf.library().list().iter().map(|b| b.title.clone()).collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press(shelf: &mut Shelf<MemoryStore>, code: KeyCode) -> Control {
        shelf.handle_key(key(code)).await
    }

    async fn type_text(shelf: &mut Shelf<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(shelf, KeyCode::Char(c)).await;
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn toast(shelf: &Shelf<MemoryStore>) -> Option<(ToastKind, String)> {
        shelf.state().toast.as_ref().map(|t| (t.kind, t.message.clone()))
    }

    /// Tick until the reader is no longer opening
    async fn settle(shelf: &mut Shelf<MemoryStore>) {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                shelf.tick(Instant::now());
                if !shelf.session().is_opening() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("reader never finished opening");
    }

    #[tokio::test]
    async fn add_book_through_form() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dune.epub");
        std::fs::write(&path, b"PK\x03\x04").unwrap();

        let mut shelf = shelf(&[]);
        press(&mut shelf, KeyCode::Char('a')).await;
        type_text(&mut shelf, "Dune").await;
        press(&mut shelf, KeyCode::Tab).await;
        type_text(&mut shelf, path.to_str().unwrap()).await;
        press(&mut shelf, KeyCode::Enter).await;

        assert_eq!(titles(&shelf), vec!["Dune"]);
        assert_eq!(shelf.library().list()[0].media_type, MediaType::Epub);
        assert!(!shelf.state().modal.is_open());
        assert_eq!(toast(&shelf), Some((ToastKind::Success, "Added \"Dune\"".into())));

        let reloaded = LibraryStore::load(shelf.library().storage().clone());
        assert_eq!(reloaded.list(), shelf.library().list());
    }

    #[tokio::test]
    async fn incomplete_form_is_silently_ignored() {
        let mut shelf = shelf(&[]);
        press(&mut shelf, KeyCode::Char('a')).await;
        type_text(&mut shelf, "Dune").await;
        press(&mut shelf, KeyCode::Enter).await;

        assert!(shelf.library().is_empty());
        assert!(matches!(shelf.state().modal, Modal::AddBook(_)));
        assert_eq!(toast(&shelf), None);

        press(&mut shelf, KeyCode::Esc).await;
        assert!(!shelf.state().modal.is_open());
    }

    #[tokio::test]
    async fn unreadable_file_reports_error() {
        let mut shelf = shelf(&[]);
        press(&mut shelf, KeyCode::Char('a')).await;
        type_text(&mut shelf, "Ghost").await;
        press(&mut shelf, KeyCode::Tab).await;
        type_text(&mut shelf, "/definitely/not/here.pdf").await;
        press(&mut shelf, KeyCode::Enter).await;

        assert!(shelf.library().is_empty());
        assert!(matches!(toast(&shelf), Some((ToastKind::Error, _))));
        assert!(matches!(shelf.state().modal, Modal::AddBook(_)));
    }

    #[tokio::test]
    async fn unsupported_file_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut shelf = shelf(&[]);
        shelf.state.modal = Modal::AddBook(AddBookForm::default());
        if let Modal::AddBook(form) = &mut shelf.state.modal {
            form.title.value = "Notes".into();
            form.path.value = path.to_string_lossy().into_owned();
        }
        shelf.submit_add_form().await;

        assert!(shelf.library().is_empty());
        assert!(matches!(toast(&shelf), Some((ToastKind::Error, _))));
    }

    #[tokio::test]
    async fn delete_with_confirmation() {
        let mut shelf = shelf(&["A", "B", "C"]);
        press(&mut shelf, KeyCode::Down).await;
        press(&mut shelf, KeyCode::Char('d')).await;
        assert!(matches!(
            &shelf.state().modal,
            Modal::ConfirmDelete { index: 1, book } if book.title == "B"
        ));

        press(&mut shelf, KeyCode::Char('y')).await;
        assert_eq!(titles(&shelf), vec!["A", "C"]);
        assert_eq!(toast(&shelf), Some((ToastKind::Success, "Deleted \"B\"".into())));
    }

    #[tokio::test]
    async fn declined_delete_changes_nothing() {
        let mut shelf = shelf(&["A", "B", "C"]);
        shelf.request_delete(1);
        press(&mut shelf, KeyCode::Char('n')).await;
        assert_eq!(titles(&shelf), vec!["A", "B", "C"]);
        assert!(!shelf.state().modal.is_open());
        assert_eq!(toast(&shelf), Some((ToastKind::Info, "Kept \"B\"".into())));
    }

    #[tokio::test]
    async fn stale_confirmation_is_refused() {
        let mut shelf = shelf(&["A", "B"]);
        shelf.request_delete(1);
        // Something else removed "A" while the prompt was up
        shelf.library.remove(0).unwrap();

        shelf.confirm_delete();
        assert_eq!(titles(&shelf), vec!["B"]);
        assert!(matches!(toast(&shelf), Some((ToastKind::Error, _))));
    }

    #[tokio::test]
    async fn confirmation_is_tied_to_the_record_not_its_title() {
        let mut shelf = shelf(&[]);
        shelf.library.add("Dune", b"first edition", MediaType::Epub).unwrap();
        shelf.library.add("Dune", b"second edition", MediaType::Epub).unwrap();

        shelf.request_delete(0);
        // The first copy goes away; the second shifts into its slot
        shelf.library.remove(0).unwrap();

        shelf.confirm_delete();
        assert_eq!(shelf.library().len(), 1);
        assert_eq!(shelf.library().list()[0].decode_payload().unwrap(), b"second edition");
        assert!(matches!(toast(&shelf), Some((ToastKind::Error, _))));
    }

    /// A TUI shelf and a second handle on the same directory, as the CLI would open it
    fn shared_shelf(dir: &std::path::Path) -> (Shelf<FileStore>, LibraryStore<FileStore>) {
        let library = LibraryStore::load(FileStore::new(dir));
        let session = ReaderSession::new(fake_renderers(FakeEpubEngine::default()));
        let shelf = Shelf::new(library, session, Config::default());
        (shelf, LibraryStore::load(FileStore::new(dir)))
    }

    #[tokio::test]
    async fn adding_keeps_books_added_from_the_cli() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("ulysses.epub");
        std::fs::write(&book, b"PK").unwrap();
        let (mut shelf, mut cli) = shared_shelf(dir.path());
        cli.add("Emma", b"e", MediaType::Pdf).unwrap();

        shelf.state.modal = Modal::AddBook(AddBookForm::default());
        if let Modal::AddBook(form) = &mut shelf.state.modal {
            form.title.value = "Ulysses".into();
            form.path.value = book.to_string_lossy().into_owned();
        }
        shelf.submit_add_form().await;

        let on_disk = LibraryStore::load(FileStore::new(dir.path()));
        let titles: Vec<_> = on_disk.list().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Emma", "Ulysses"]);
        assert_eq!(shelf.library().list(), on_disk.list());
        assert_eq!(shelf.state().library.selected, 1);
    }

    #[tokio::test]
    async fn deleting_does_not_restore_books_removed_from_the_cli() {
        let dir = tempfile::tempdir().unwrap();
        let (mut shelf, mut cli) = shared_shelf(dir.path());
        shelf.library.add("A", b"a", MediaType::Pdf).unwrap();
        shelf.library.add("B", b"b", MediaType::Pdf).unwrap();
        shelf.library.add("C", b"c", MediaType::Pdf).unwrap();
        cli.reload();

        shelf.request_delete(2);
        cli.remove(0).unwrap();
        shelf.confirm_delete();

        let on_disk = LibraryStore::load(FileStore::new(dir.path()));
        let titles: Vec<_> = on_disk.list().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C"]);
        assert_eq!(shelf.library().list(), on_disk.list());
        assert_eq!(shelf.state().library.selected, 0);
    }

    #[tokio::test]
    async fn delete_click_never_activates() {
        let mut shelf = shelf(&["A", "B", "C"]);
        shelf.state.library.list_area = Rect::new(1, 1, 40, 9);
        shelf.state.library.visible_cards = 3;

        shelf.handle_mouse(click(39, 5));
        assert!(matches!(shelf.state().modal, Modal::ConfirmDelete { index: 1, .. }));
        assert_eq!(shelf.state().screen, Screen::Library);
        assert_eq!(shelf.session().active_format(), ActiveFormat::None);

        shelf.state.modal = Modal::None;
        shelf.handle_mouse(click(5, 1));
        assert_eq!(shelf.state().screen, Screen::Reader);
        assert_eq!(shelf.session().title(), Some("A"));
    }

    #[tokio::test]
    async fn click_outside_add_form_dismisses_it() {
        let mut shelf = shelf(&[]);
        press(&mut shelf, KeyCode::Char('a')).await;
        shelf.state.modal_area = Rect::new(10, 5, 40, 10);

        shelf.handle_mouse(click(20, 8));
        assert!(shelf.state().modal.is_open());
        shelf.handle_mouse(click(0, 0));
        assert!(!shelf.state().modal.is_open());
    }

    #[tokio::test]
    async fn read_pdf_to_the_end_and_back_to_shelf() {
        let mut shelf = shelf(&["Manual"]);
        press(&mut shelf, KeyCode::Enter).await;
        assert_eq!(shelf.state().screen, Screen::Reader);
        settle(&mut shelf).await;

        for _ in 0..FAKE_PDF_PAGES + 3 {
            press(&mut shelf, KeyCode::Right).await;
        }
        assert_eq!(
            shelf.session().position(),
            Some(ReaderPosition::Pdf { page: FAKE_PDF_PAGES, page_count: FAKE_PDF_PAGES })
        );
        assert!(!shelf.session().can_next());

        press(&mut shelf, KeyCode::Esc).await;
        assert_eq!(shelf.state().screen, Screen::Library);
        assert_eq!(shelf.session().active_format(), ActiveFormat::None);
    }

    #[tokio::test]
    async fn unknown_media_type_shows_error_and_stays_on_shelf() {
        let mut storage = MemoryStore::new();
        storage
            .set(LIBRARY_KEY, r#"[{"title":"Notes","payload":"aGk=","mediaType":"text/plain"}]"#)
            .unwrap();
        let mut shelf = shelf_with(storage);

        shelf.activate(0);
        assert_eq!(shelf.state().screen, Screen::Library);
        assert!(matches!(toast(&shelf), Some((ToastKind::Error, m)) if m.contains("Notes")));
    }

    #[tokio::test]
    async fn renderer_failure_returns_to_shelf_with_toast() {
        let mut shelf = shelf(&[]);
        shelf.library.add("Bad", b"broken", MediaType::Pdf).unwrap();

        shelf.activate(0);
        assert_eq!(shelf.state().screen, Screen::Reader);
        settle(&mut shelf).await;

        assert_eq!(shelf.state().screen, Screen::Library);
        assert!(matches!(toast(&shelf), Some((ToastKind::Error, m)) if m.starts_with("Could not open")));
    }

    #[tokio::test]
    async fn toast_expires_on_tick() {
        let mut shelf = shelf(&["A"]);
        shelf.toast(ToastKind::Info, "hello");
        let shown = shelf.state().toast.as_ref().unwrap().shown_at;

        shelf.tick(shown + Duration::from_secs(1));
        assert!(shelf.state().toast.is_some());
        shelf.tick(shown + Duration::from_secs(3));
        assert!(shelf.state().toast.is_none());
    }

    #[tokio::test]
    async fn quit_from_library() {
        let mut shelf = shelf(&[]);
        assert_eq!(press(&mut shelf, KeyCode::Char('q')).await, Control::Quit);
    }

    #[tokio::test]
    async fn removed_record_matches_storage() {
        let mut shelf = shelf(&["A", "B"]);
        shelf.request_delete(0);
        shelf.confirm_delete();
        let raw = shelf.library().storage().get(LIBRARY_KEY).unwrap().unwrap();
        let stored: Vec<BookRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, shelf.library().list());
    }
}
