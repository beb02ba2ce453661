//! booklib - Book library catalog
//!
//! Manage a catalog of books through one store interface, whether the books
//! live in process memory or behind a REST service.
//!
//! # Architecture
//!
//! The store is the only owner of book records:
//! - Front ends hold copies and drafts, never the source of truth
//! - Every successful create/update/delete is followed by a fresh fetch
//! - Local and remote backings are interchangeable behind `CatalogStore`
//!
//! # Modules
//!
//! - `domain`: Data structures (Book, BookDraft, Envelope)
//! - `store`: The `CatalogStore` trait with memory and HTTP backings
//! - `search`: Case-insensitive text filtering
//! - `form`: Create/edit form workflow
//! - `session`: View state (list, search, form, notices)
//! - `server`: HTTP book service over the memory backing
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Serve a sample catalog
//! booklib serve --address 127.0.0.1:8080
//!
//! # Talk to it
//! booklib --backend remote list --search orwell
//! booklib --backend remote add --title Dune --author "Frank Herbert" --isbn 123 --year 1965
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod form;
pub mod search;
pub mod server;
pub mod session;
pub mod store;

// Re-export main types at crate root for convenience
pub use domain::{Book, BookDraft, BookId, Envelope, ValidationError};
pub use form::{FormController, FormMode, FormState, Submitted};
pub use search::{SearchField, SearchQuery};
pub use session::{LibrarySession, Notice, NoticeLevel};
pub use store::{CatalogError, CatalogStore, HttpStore, ListFilter, MemoryStore};
