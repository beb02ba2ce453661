//! Interactive library session.
//!
//! Holds everything a front end renders: the last fetched book list, the
//! total count, the search query, the form, and pending notices. The session
//! never patches its list locally. Every successful mutation is followed by a
//! fresh `list` + `stats` from the store, which stays the only source of truth.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::domain::{Book, BookId};
use crate::form::{FormController, Submitted};
use crate::search::{self, SearchQuery};
use crate::store::{CatalogError, CatalogResult, CatalogStore, ListFilter};

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// View state over a catalog store
pub struct LibrarySession {
    store: Arc<dyn CatalogStore>,
    books: Vec<Book>,
    total: u64,
    filter: ListFilter,
    query: SearchQuery,
    form: FormController,
    notices: Vec<Notice>,
}

impl LibrarySession {
    /// Start a session; nothing is fetched until [`load`](Self::load)
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            books: Vec::new(),
            total: 0,
            filter: ListFilter::All,
            query: SearchQuery::default(),
            form: FormController::new(),
            notices: Vec::new(),
        }
    }

    /// Books from the last fetch; the store filter applies, the search does not
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Total count reported by the store
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Store-side filter used by every fetch
    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    /// Takes effect on the next fetch
    pub fn set_filter(&mut self, filter: ListFilter) {
        self.filter = filter;
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn set_search(&mut self, query: SearchQuery) {
        self.query = query;
    }

    /// Books to display: the last fetch narrowed by the current query
    pub fn visible(&self) -> Vec<&Book> {
        search::filter(&self.books, &self.query)
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    /// Pending notices, oldest first
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Take all pending notices
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Initial fetch of books and stats
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn load(&mut self) -> CatalogResult<()> {
        match self.reload().await {
            Ok(()) => {
                info!(count = self.books.len(), "Books loaded");
                self.notices
                    .push(Notice::info("Books loaded", "Successfully loaded all books"));
                Ok(())
            }
            Err(e) => {
                self.notify_failure("Failed to load books", &e);
                Err(e)
            }
        }
    }

    /// Begin editing a stored book
    #[instrument(skip(self))]
    pub async fn edit(&mut self, id: BookId) -> CatalogResult<()> {
        match self.store.get(id).await {
            Ok(book) => {
                self.form.load(&book);
                Ok(())
            }
            Err(e) => {
                self.notify_failure("Failed to load book", &e);
                Err(e)
            }
        }
    }

    /// Abandon the current draft
    pub fn cancel_edit(&mut self) {
        self.form.cancel();
    }

    /// Submit the form, then re-query the store
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> CatalogResult<Submitted> {
        let submitted = match self.form.submit(self.store.as_ref()).await {
            Ok(submitted) => submitted,
            Err(e) => {
                self.notify_failure("Failed to save book", &e);
                return Err(e);
            }
        };

        let notice = match &submitted {
            Submitted::Created(book) => Notice::info(
                "Book created",
                format!("\"{}\" has been added to the library", book.title),
            ),
            Submitted::Updated(book) => Notice::info(
                "Book updated",
                format!("\"{}\" has been updated successfully", book.title),
            ),
        };
        info!(id = %submitted.book().id, "{}", notice.title);
        self.notices.push(notice);

        self.reload_after_mutation().await;
        Ok(submitted)
    }

    /// Delete a book, then re-query the store
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: BookId) -> CatalogResult<()> {
        if let Err(e) = self.store.remove(id).await {
            self.notify_failure("Failed to delete book", &e);
            return Err(e);
        }

        if self.form.editing_id() == Some(id) {
            self.form.cancel();
        }

        info!(%id, "Book deleted");
        self.notices.push(Notice::info(
            "Book deleted",
            "The book has been removed from the library",
        ));

        self.reload_after_mutation().await;
        Ok(())
    }

    /// Re-query books and total; a failure leaves the previous list in place
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn refresh(&mut self) -> CatalogResult<()> {
        let result = self.reload().await;
        if let Err(e) = &result {
            self.notify_failure("Failed to refresh books", e);
        }
        result
    }

    async fn reload(&mut self) -> CatalogResult<()> {
        let books = self.store.list(&self.filter).await?;
        let total = self.store.stats().await?;
        self.books = books;
        self.total = total;
        Ok(())
    }

    /// The mutation already succeeded; a failed refresh is only reported
    async fn reload_after_mutation(&mut self) {
        let _ = self.refresh().await;
    }

    fn notify_failure(&mut self, title: &str, error: &CatalogError) {
        warn!(error = %error, "{}", title);
        self.notices
            .push(Notice::error(title, error.user_message()));
    }
}
