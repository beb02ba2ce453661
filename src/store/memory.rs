//! In-memory catalog backing.
//!
//! Records live in insertion order behind a mutex, so one store can be shared
//! (`Arc<MemoryStore>`) between the CLI session and the HTTP server handlers.
//! Every operation takes the lock once and either applies fully or not at all.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::debug;

use crate::domain::{Book, BookDraft, BookId};
use crate::search;

use super::{CatalogError, CatalogResult, CatalogStore, ListFilter};

/// Catalog held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    books: Vec<Book>,

    /// Next id to hand out; ids are never reused
    next_id: i64,

    /// Last timestamp handed out, keeps mutation times strictly increasing
    last_stamp: DateTime<Utc>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            books: Vec::new(),
            next_id: 1,
            last_stamp: DateTime::<Utc>::MIN_UTC,
        }
    }
}

impl Inner {
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = if now > self.last_stamp {
            now
        } else {
            self.last_stamp + Duration::microseconds(1)
        };
        self.last_stamp = stamp;
        stamp
    }

    fn position(&self, id: BookId) -> CatalogResult<usize> {
        self.books
            .iter()
            .position(|b| b.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    fn has_isbn(&self, isbn: &str) -> bool {
        let isbn = isbn.trim();
        self.books.iter().any(|b| b.isbn == isbn)
    }

    fn insert(&mut self, draft: &BookDraft, at: DateTime<Utc>) -> CatalogResult<Book> {
        let book = Book::create(BookId(self.next_id), draft, at)?;
        self.next_id += 1;
        self.books.push(book.clone());
        Ok(book)
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the three sample books
    pub fn with_sample_data() -> Self {
        let store = Self::new();
        {
            let mut inner = store.lock();
            let seeded_at = Utc
                .with_ymd_and_hms(2023, 12, 7, 10, 0, 0)
                .single()
                .unwrap_or_else(Utc::now);

            for draft in sample_drafts() {
                if let Err(e) = inner.insert(&draft, seeded_at) {
                    debug!(error = %e, "Skipping invalid sample book");
                }
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a record unless its ISBN is already taken.
    ///
    /// Returns `Ok(None)` for a duplicate. The check and the insert happen
    /// under one lock, so concurrent requests cannot both claim an ISBN.
    pub fn create_with_unique_isbn(&self, draft: &BookDraft) -> CatalogResult<Option<Book>> {
        draft.validate()?;

        let mut inner = self.lock();
        if inner.has_isbn(&draft.isbn) {
            return Ok(None);
        }

        let at = inner.stamp();
        let book = inner.insert(draft, at)?;
        debug!(id = %book.id, title = %book.title, "Book created");
        Ok(Some(book))
    }

    /// Copy of all records in insertion order
    pub fn snapshot(&self) -> Vec<Book> {
        self.lock().books.clone()
    }
}

/// Fixed sample set used to seed a fresh local catalog
pub fn sample_drafts() -> Vec<BookDraft> {
    vec![
        BookDraft::new(
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            "978-0-7432-7356-5",
            1925,
        )
        .with_genre("Fiction")
        .with_description("A classic American novel about the Jazz Age"),
        BookDraft::new(
            "To Kill a Mockingbird",
            "Harper Lee",
            "978-0-06-112008-4",
            1960,
        )
        .with_genre("Fiction")
        .with_description("A gripping tale of racial injustice and childhood innocence"),
        BookDraft::new("1984", "George Orwell", "978-0-452-28423-4", 1949)
            .with_genre("Dystopian Fiction")
            .with_description("A dystopian social science fiction novel"),
    ]
}

#[async_trait]
impl CatalogStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list(&self, filter: &ListFilter) -> CatalogResult<Vec<Book>> {
        let inner = self.lock();
        let query = filter.as_query();
        Ok(search::filter(&inner.books, &query)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn get(&self, id: BookId) -> CatalogResult<Book> {
        let inner = self.lock();
        let pos = inner.position(id)?;
        Ok(inner.books[pos].clone())
    }

    async fn create(&self, draft: &BookDraft) -> CatalogResult<Book> {
        draft.validate()?;

        let mut inner = self.lock();
        let at = inner.stamp();
        let book = inner.insert(draft, at)?;
        debug!(id = %book.id, title = %book.title, "Book created");
        Ok(book)
    }

    async fn update(&self, id: BookId, draft: &BookDraft) -> CatalogResult<Book> {
        draft.validate()?;

        let mut inner = self.lock();
        let pos = inner.position(id)?;
        let at = inner.stamp();
        let book = &mut inner.books[pos];
        book.apply(draft, at)?;
        debug!(%id, "Book updated");
        Ok(book.clone())
    }

    async fn remove(&self, id: BookId) -> CatalogResult<()> {
        let mut inner = self.lock();
        let pos = inner.position(id)?;
        inner.books.remove(pos);
        debug!(%id, "Book removed");
        Ok(())
    }

    async fn stats(&self) -> CatalogResult<u64> {
        Ok(self.lock().books.len() as u64)
    }
}
