//! Application state and event handling

pub mod input;
pub mod shelf;
pub mod state;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::Config;
use crate::library::LibraryStore;
use crate::reader::{ReaderSession, Renderers};
use crate::storage::FileStore;
use shelf::{Control, Shelf};

/// The main application
pub struct App {
    /// Library, reader and screen state
    shelf: Shelf<FileStore>,

    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create a new application instance over `library`
    pub fn new(config: Config, library: LibraryStore<FileStore>) -> Result<Self> {
        let session = ReaderSession::new(Renderers::native());
        let shelf = Shelf::new(library, session, config);
        let terminal = Self::setup_terminal()?;

        Ok(Self { shelf, terminal })
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        let size = self.terminal.size()?;
        self.shelf.resize(size.width, size.height);

        loop {
            // Draw UI
            self.terminal.draw(|frame| self.shelf.draw(frame))?;

            // Handle events
            if event::poll(Duration::from_millis(16))? {
                let control = match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.shelf.handle_key(key).await
                    }
                    Event::Mouse(mouse) => self.shelf.handle_mouse(mouse),
                    Event::Resize(width, height) => {
                        self.shelf.resize(width, height);
                        Control::Continue
                    }
                    _ => Control::Continue,
                };
                if control == Control::Quit {
                    break;
                }
            }

            // Pick up renderer completions
            self.shelf.tick(Instant::now());
        }

        self.restore_terminal()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}
