//! Command-line interface for booklib.
//!
//! Provides commands for listing and searching the catalog, adding, editing
//! and removing books, showing stats, and serving the catalog over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::warn;

use crate::config::{self, Backend, ResolvedConfig, Seed};
use crate::domain::{BookDraft, BookId};
use crate::search::SearchQuery;
use crate::server;
use crate::session::LibrarySession;
use crate::store::{CatalogStore, HttpStore, ListFilter, MemoryStore};

pub mod render;

/// booklib - Book library catalog
#[derive(Parser, Debug)]
#[command(name = "booklib")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog backing (overrides config and BOOKLIB_BACKEND)
    #[arg(short, long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    /// Base URL of the book service for the remote backing
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List books
    List {
        /// Only books whose author contains this text (filtered by the store)
        #[arg(long, conflicts_with = "genre")]
        author: Option<String>,

        /// Only books whose genre contains this text (filtered by the store)
        #[arg(long)]
        genre: Option<String>,

        /// Search title, author and genre
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show details of a book
    Show {
        /// Book ID
        id: BookId,
    },

    /// Add a new book
    Add {
        #[command(flatten)]
        fields: DraftFields,
    },

    /// Edit an existing book (only the given fields change)
    Edit {
        /// Book ID
        id: BookId,

        #[command(flatten)]
        fields: DraftFields,
    },

    /// Remove a book
    Remove {
        /// Book ID
        id: BookId,
    },

    /// Show the total number of books
    Stats,

    /// Serve an in-memory catalog over HTTP
    Serve {
        /// Address to bind to (defaults to config / BOOKLIB_BIND)
        #[arg(short, long)]
        address: Option<String>,

        /// Start with an empty catalog instead of the sample books
        #[arg(long)]
        empty: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Book fields accepted by `add` and `edit`
#[derive(Args, Debug, Default)]
pub struct DraftFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub isbn: Option<String>,

    /// Publication year
    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

impl DraftFields {
    /// Overwrite the fields that were given on the command line
    pub fn apply_to(self, draft: &mut BookDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(author) = self.author {
            draft.author = author;
        }
        if let Some(isbn) = self.isbn {
            draft.isbn = isbn;
        }
        if let Some(year) = self.year {
            draft.publication_year = Some(year);
        }
        if let Some(genre) = self.genre {
            draft.genre = Some(genre);
        }
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
    }
}

/// Backing for CLI (maps to Backend)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendArg {
    /// Local catalog, lives only for this process
    Memory,

    /// Remote book service
    Remote,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => Backend::Memory,
            BackendArg::Remote => Backend::Remote,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let mut cfg = config::config()?.clone();
        if let Some(backend) = self.backend {
            cfg.backend = backend.into();
        }
        if let Some(api_base) = self.api_base {
            cfg.api_base = api_base;
        }

        match self.command {
            Commands::List {
                author,
                genre,
                search,
            } => list_books(&cfg, author, genre, search).await,
            Commands::Show { id } => show_book(&cfg, id).await,
            Commands::Add { fields } => add_book(&cfg, fields).await,
            Commands::Edit { id, fields } => edit_book(&cfg, id, fields).await,
            Commands::Remove { id } => remove_book(&cfg, id).await,
            Commands::Stats => show_stats(&cfg).await,
            Commands::Serve { address, empty } => serve(&cfg, address, empty).await,
            Commands::Config => show_config(&cfg),
        }
    }
}

/// Build the configured catalog backing
pub fn open_store(cfg: &ResolvedConfig) -> Result<Arc<dyn CatalogStore>> {
    match cfg.backend {
        Backend::Memory => {
            warn!("Using the in-memory catalog; changes last only for this command");
            Ok(Arc::new(local_store(cfg.seed)))
        }
        Backend::Remote => {
            let store = HttpStore::with_timeout(&cfg.api_base, cfg.request_timeout)
                .context("Failed to build HTTP client")?;
            Ok(Arc::new(store))
        }
    }
}

fn local_store(seed: Seed) -> MemoryStore {
    match seed {
        Seed::Sample => MemoryStore::with_sample_data(),
        Seed::Empty => MemoryStore::new(),
    }
}

/// Open and load a session; load failures surface as the returned error
async fn open_session(cfg: &ResolvedConfig) -> Result<LibrarySession> {
    let mut session = LibrarySession::new(open_store(cfg)?);
    let loaded = session.load().await;
    session.drain_notices();
    loaded.context("Failed to load books")?;
    Ok(session)
}

/// List books with optional store-side filter and client-side search
async fn list_books(
    cfg: &ResolvedConfig,
    author: Option<String>,
    genre: Option<String>,
    search: Option<String>,
) -> Result<()> {
    let filter = match (author, genre) {
        (Some(author), _) => ListFilter::Author(author),
        (None, Some(genre)) => ListFilter::Genre(genre),
        (None, None) => ListFilter::All,
    };

    let mut session = LibrarySession::new(open_store(cfg)?);
    session.set_filter(filter);
    let loaded = session.load().await;
    render::print_notices(&session.drain_notices());
    loaded.context("Failed to load books")?;

    if let Some(term) = search {
        session.set_search(SearchQuery::new(term));
    }

    let visible = session.visible();
    if visible.is_empty() {
        if session.query().is_blank() {
            println!("No books in the library.");
        } else {
            println!("No books match \"{}\"", session.query().term);
        }
        return Ok(());
    }

    render::print_book_table(&visible);
    println!(
        "\nShowing {} of {} books",
        visible.len(),
        session.total()
    );

    Ok(())
}

/// Show details of a single book
async fn show_book(cfg: &ResolvedConfig, id: BookId) -> Result<()> {
    let store = open_store(cfg)?;
    let book = store
        .get(id)
        .await
        .with_context(|| format!("Failed to fetch book {}", id))?;

    render::print_book_details(&book);
    Ok(())
}

/// Add a book through the form workflow
async fn add_book(cfg: &ResolvedConfig, fields: DraftFields) -> Result<()> {
    let mut session = open_session(cfg).await?;
    fields.apply_to(session.form_mut().draft_mut());

    let submitted = session.submit().await;
    render::print_notices(&session.drain_notices());
    let submitted = submitted.context("Book was not added")?;

    render::print_book_details(submitted.book());
    println!("\nTotal: {} books", session.total());
    Ok(())
}

/// Edit a book through the form workflow
async fn edit_book(cfg: &ResolvedConfig, id: BookId, fields: DraftFields) -> Result<()> {
    let mut session = open_session(cfg).await?;

    let loaded = session.edit(id).await;
    if loaded.is_err() {
        render::print_notices(&session.drain_notices());
    }
    loaded.with_context(|| format!("Cannot edit book {}", id))?;

    fields.apply_to(session.form_mut().draft_mut());

    let submitted = session.submit().await;
    render::print_notices(&session.drain_notices());
    let submitted = submitted.context("Book was not updated")?;

    render::print_book_details(submitted.book());
    Ok(())
}

/// Remove a book
async fn remove_book(cfg: &ResolvedConfig, id: BookId) -> Result<()> {
    let mut session = open_session(cfg).await?;

    let removed = session.delete(id).await;
    render::print_notices(&session.drain_notices());
    removed.with_context(|| format!("Book {} was not removed", id))?;

    println!("Total: {} books", session.total());
    Ok(())
}

/// Show the total number of books
async fn show_stats(cfg: &ResolvedConfig) -> Result<()> {
    let store = open_store(cfg)?;
    let total = store.stats().await.context("Failed to fetch stats")?;

    println!("Total books: {}", total);
    Ok(())
}

/// Serve an in-memory catalog over HTTP
async fn serve(cfg: &ResolvedConfig, address: Option<String>, empty: bool) -> Result<()> {
    let seed = if empty { Seed::Empty } else { cfg.seed };
    let store = Arc::new(local_store(seed));
    let address = address.unwrap_or_else(|| cfg.bind.clone());

    server::serve(&address, &cfg.base_path, store).await
}

/// Show the resolved configuration (for debugging)
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("booklib configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Catalog:");
    println!("  Backend:         {}", cfg.backend);
    println!("  API base:        {}", cfg.api_base);
    println!("  Request timeout: {}s", cfg.request_timeout.as_secs());
    println!("  Local seed:      {:?}", cfg.seed);
    println!();
    println!("Server:");
    println!("  Bind:            {}", cfg.bind);
    println!("  Base path:       {}", cfg.base_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_command() {
        let cli = Cli::try_parse_from([
            "booklib", "add", "--title", "Dune", "--author", "Frank Herbert", "--isbn", "123",
            "--year", "1965", "--genre", "SciFi",
        ])
        .unwrap();

        match cli.command {
            Commands::Add { fields } => {
                let mut draft = BookDraft::default();
                fields.apply_to(&mut draft);
                assert_eq!(
                    draft,
                    BookDraft::new("Dune", "Frank Herbert", "123", 1965).with_genre("SciFi")
                );
            }
            other => panic!("Expected Add, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_backend_after_subcommand() {
        let cli = Cli::try_parse_from(["booklib", "stats", "--backend", "remote"]).unwrap();
        assert!(matches!(cli.backend, Some(BackendArg::Remote)));
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn test_author_and_genre_conflict() {
        let result = Cli::try_parse_from(["booklib", "list", "--author", "a", "--genre", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_only_overrides_given_fields() {
        let mut draft = BookDraft::new("1984", "George Orwell", "978-0-452-28423-4", 1949)
            .with_genre("Dystopian Fiction");
        let fields = DraftFields {
            genre: Some("Classic".to_string()),
            ..Default::default()
        };

        fields.apply_to(&mut draft);
        assert_eq!(draft.title, "1984");
        assert_eq!(draft.genre.as_deref(), Some("Classic"));
    }

    #[test]
    fn test_invalid_id_rejected() {
        assert!(Cli::try_parse_from(["booklib", "show", "abc"]).is_err());
    }
}
