//! Book form workflow.
//!
//! The form is either creating a new book or editing an existing one:
//!
//! ```text
//!            load(book)
//!   Creating ──────────▶ Editing(id)
//!      ▲                    │
//!      └── submit ok / cancel
//! ```
//!
//! A failed submit (validation or store error) leaves mode and draft exactly
//! as they were so the user can correct the input and try again.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Book, BookDraft, BookId};
use crate::store::{CatalogResult, CatalogStore};

/// What a submit will do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "id")]
pub enum FormMode {
    #[default]
    Creating,

    /// Editing the record with this id
    Editing(BookId),
}

/// Complete form state, serializable so it can be inspected or restored
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormState {
    pub mode: FormMode,
    pub draft: BookDraft,
}

/// Outcome of a successful submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Created(Book),
    Updated(Book),
}

impl Submitted {
    /// The stored record
    pub fn book(&self) -> &Book {
        match self {
            Submitted::Created(book) | Submitted::Updated(book) => book,
        }
    }
}

/// Drives a single draft through create or update
#[derive(Debug, Clone, Default)]
pub struct FormController {
    state: FormState,
}

impl FormController {
    /// A fresh form in Creating mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously captured state
    pub fn from_state(state: FormState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn mode(&self) -> FormMode {
        self.state.mode
    }

    pub fn draft(&self) -> &BookDraft {
        &self.state.draft
    }

    /// Mutable access for field edits
    pub fn draft_mut(&mut self) -> &mut BookDraft {
        &mut self.state.draft
    }

    /// Id of the record being edited, if any
    pub fn editing_id(&self) -> Option<BookId> {
        match self.state.mode {
            FormMode::Creating => None,
            FormMode::Editing(id) => Some(id),
        }
    }

    /// Start editing `book`
    pub fn load(&mut self, book: &Book) {
        self.state = FormState {
            mode: FormMode::Editing(book.id),
            draft: BookDraft::from(book),
        };
    }

    /// Validate and push the draft through the store.
    ///
    /// On success the form is reset to an empty Creating state.
    pub async fn submit(&mut self, store: &dyn CatalogStore) -> CatalogResult<Submitted> {
        self.state.draft.validate()?;

        let submitted = match self.state.mode {
            FormMode::Creating => Submitted::Created(store.create(&self.state.draft).await?),
            FormMode::Editing(id) => Submitted::Updated(store.update(id, &self.state.draft).await?),
        };

        debug!(id = %submitted.book().id, "Form submitted");
        self.reset();
        Ok(submitted)
    }

    /// Discard the draft and return to Creating
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = FormState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CatalogError, ListFilter, MemoryStore};

    fn dune() -> BookDraft {
        BookDraft::new("Dune", "Frank Herbert", "123", 1965).with_genre("SciFi")
    }

    #[tokio::test]
    async fn test_submit_creates_and_resets() {
        let store = MemoryStore::new();
        let mut form = FormController::new();
        *form.draft_mut() = dune();

        let submitted = form.submit(&store).await.unwrap();
        assert!(matches!(submitted, Submitted::Created(_)));
        assert_eq!(submitted.book().genre.as_deref(), Some("SciFi"));

        assert_eq!(form.mode(), FormMode::Creating);
        assert_eq!(form.draft(), &BookDraft::default());
        assert_eq!(store.stats().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_then_submit_updates() {
        let store = MemoryStore::with_sample_data();
        let book = store.get(BookId(3)).await.unwrap();

        let mut form = FormController::new();
        form.load(&book);
        assert_eq!(form.mode(), FormMode::Editing(BookId(3)));
        assert_eq!(form.draft().title, "1984");

        form.draft_mut().title = "Nineteen Eighty-Four".to_string();
        let submitted = form.submit(&store).await.unwrap();

        assert!(matches!(submitted, Submitted::Updated(_)));
        assert_eq!(submitted.book().id, BookId(3));
        assert_eq!(form.editing_id(), None);

        let stored = store.get(BookId(3)).await.unwrap();
        assert_eq!(stored.title, "Nineteen Eighty-Four");
        assert_eq!(store.stats().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_validation_failure_preserves_state() {
        let store = MemoryStore::new();
        let mut form = FormController::new();
        *form.draft_mut() = dune();
        form.draft_mut().author = "  ".to_string();
        let before = form.state().clone();

        let err = form.submit(&store).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(form.state(), &before);
        assert!(store.list(&ListFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_preserves_state() {
        let store = MemoryStore::with_sample_data();
        let book = store.get(BookId(1)).await.unwrap();

        let mut form = FormController::new();
        form.load(&book);
        store.remove(BookId(1)).await.unwrap();
        let before = form.state().clone();

        let err = form.submit(&store).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(form.state(), &before);
        assert_eq!(form.mode(), FormMode::Editing(BookId(1)));
    }

    #[test]
    fn test_cancel_clears_edit_target() {
        let mut form = FormController::new();
        let book = Book::create(BookId(5), &dune(), chrono::Utc::now()).unwrap();
        form.load(&book);

        form.cancel();
        assert_eq!(form.mode(), FormMode::Creating);
        assert_eq!(form.editing_id(), None);
        assert_eq!(form.draft(), &BookDraft::default());
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut form = FormController::new();
        let book = Book::create(BookId(5), &dune(), chrono::Utc::now()).unwrap();
        form.load(&book);

        let json = serde_json::to_string(form.state()).unwrap();
        let restored = FormController::from_state(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.state(), form.state());
    }
}
