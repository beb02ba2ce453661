//! Catalog stores: the owners of the canonical book set.
//!
//! Callers talk to [`CatalogStore`] and never need to know which backing is
//! active:
//! - [`MemoryStore`]: local collection, optionally seeded with sample books
//! - [`HttpStore`]: remote REST service wrapped in [`Envelope`](crate::domain::Envelope)s

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Book, BookDraft, BookId, ValidationError};
use crate::search::{SearchField, SearchQuery};

pub use http::HttpStore;
pub use memory::MemoryStore;

/// Errors surfaced by catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid book: {0}")]
    Validation(#[from] ValidationError),

    #[error("Book not found with id: {0}")]
    NotFound(BookId),

    /// Non-2xx response (or `success: false`) from the remote service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl CatalogError {
    /// True for a missing record, whichever backing reported it
    pub fn is_not_found(&self) -> bool {
        match self {
            CatalogError::NotFound(_) => true,
            CatalogError::Api { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Validation(e) => e.to_string(),
            CatalogError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Single-field pre-filter applied by the store itself
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "term")]
pub enum ListFilter {
    #[default]
    All,

    Author(String),

    Genre(String),
}

impl ListFilter {
    /// Equivalent search query, used by the local backing
    pub fn as_query(&self) -> SearchQuery {
        match self {
            ListFilter::All => SearchQuery::default(),
            ListFilter::Author(term) => SearchQuery::new(term.clone()).in_field(SearchField::Author),
            ListFilter::Genre(term) => SearchQuery::new(term.clone()).in_field(SearchField::Genre),
        }
    }

    /// Query-string pair for the remote backing; `None` when nothing filters
    pub fn query_pair(&self) -> Option<(&'static str, &str)> {
        match self {
            ListFilter::Author(term) if !term.trim().is_empty() => Some(("author", term)),
            ListFilter::Genre(term) if !term.trim().is_empty() => Some(("genre", term)),
            _ => None,
        }
    }
}

/// Create/read/update/delete access to the book catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Short backing name for logs
    fn name(&self) -> &str;

    /// Current records, optionally narrowed by one field
    async fn list(&self, filter: &ListFilter) -> CatalogResult<Vec<Book>>;

    /// Single record by id
    async fn get(&self, id: BookId) -> CatalogResult<Book>;

    /// Validate and store a new record; assigns id and timestamps
    async fn create(&self, draft: &BookDraft) -> CatalogResult<Book>;

    /// Replace the mutable fields of an existing record
    async fn update(&self, id: BookId, draft: &BookDraft) -> CatalogResult<Book>;

    /// Delete a record
    async fn remove(&self, id: BookId) -> CatalogResult<()>;

    /// Number of live records
    async fn stats(&self) -> CatalogResult<u64>;
}
