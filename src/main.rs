use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tusach::library::{LibraryStore, MediaType};
use tusach::storage::FileStore;
use tusach::ui::library::human_size;
use tusach::{App, Config};

#[derive(Parser)]
#[command(name = "tusach")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Keep the library in this directory instead of the default
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a book to your library
    Add {
        /// Path to an EPUB or PDF file
        path: PathBuf,
        /// Title to show on the shelf (defaults to the file name)
        #[arg(short, long)]
        title: Option<String>,
        /// Format of the file, when the extension does not say
        #[arg(short, long, value_enum)]
        media_type: Option<MediaTypeArg>,
    },
    /// List books in your library
    List,
    /// Remove a book from your library
    Remove {
        /// Position of the book, as shown by `list`
        index: usize,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MediaTypeArg {
    Epub,
    Pdf,
}

impl From<MediaTypeArg> for MediaType {
    fn from(arg: MediaTypeArg) -> Self {
        match arg {
            MediaTypeArg::Epub => MediaType::Epub,
            MediaTypeArg::Pdf => MediaType::Pdf,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "tusach=info".into())
}

/// Log to stderr for one-shot commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Log to a file so the alternate screen stays clean
fn init_tui_logging(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;
    let path = data_dir.join("tusach.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn open_library(config: &Config, data_dir: &Path) -> LibraryStore<FileStore> {
    LibraryStore::load(FileStore::new(data_dir)).with_max_payload_bytes(config.max_book_bytes())
}

fn add(
    library: &mut LibraryStore<FileStore>,
    path: &Path,
    title: Option<String>,
    media_type: Option<MediaTypeArg>,
) -> Result<()> {
    let media_type = media_type.map(MediaType::from).unwrap_or_else(|| MediaType::from_path(path));
    let title = match title {
        Some(title) => title,
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .context("Cannot derive a title from the path; pass --title")?,
    };
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;

    let book = library.add(&title, &bytes, media_type)?;
    println!("Added \"{}\" ({}, {})", book.title, book.media_type.label(), human_size(bytes.len()));
    Ok(())
}

fn list(library: &LibraryStore<FileStore>) {
    if library.is_empty() {
        println!("No books yet. Run `tusach add <path>` to add your first one!");
        return;
    }
    for (index, book) in library.list().iter().enumerate() {
        println!(
            "{index:>3}  {:<4}  {:>8}  {}",
            book.media_type.label(),
            human_size(book.size_hint()),
            book.title
        );
    }
}

fn remove(library: &mut LibraryStore<FileStore>, index: usize, yes: bool) -> Result<()> {
    let Some(book) = library.get(index) else {
        bail!("No book at position {} (library has {})", index, library.len());
    };

    if !yes {
        print!("Delete \"{}\"? [y/N] ", book.title);
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Kept \"{}\"", book.title);
            return Ok(());
        }
    }

    let removed = library.remove(index)?;
    println!("Deleted \"{}\"", removed.title);
    Ok(())
}

/// Settings from disk, or the defaults when they cannot be read
fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {:#}", e);
        Config::default()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = Config::data_dir(cli.data_dir.as_deref())?;

    match cli.command {
        Some(Commands::Add { path, title, media_type }) => {
            init_cli_logging();
            let mut library = open_library(&load_config(), &data_dir);
            add(&mut library, &path, title, media_type)?;
        }
        Some(Commands::List) => {
            init_cli_logging();
            list(&open_library(&load_config(), &data_dir));
        }
        Some(Commands::Remove { index, yes }) => {
            init_cli_logging();
            let mut library = open_library(&load_config(), &data_dir);
            remove(&mut library, index, yes)?;
        }
        None => {
            // Launch TUI
            init_tui_logging(&data_dir)?;
            let config = load_config();
            let library = open_library(&config, &data_dir);
            let mut app = App::new(config, library)?;
            app.run().await?;
        }
    }

    Ok(())
}
