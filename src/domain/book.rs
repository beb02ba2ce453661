//! Book records and the drafts they are created from.
//!
//! A [`Book`] is only ever constructed by a store from a [`BookDraft`] that
//! passed validation, so its required fields are never blank.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::timestamp;

/// Store-assigned book identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(BookId)
    }
}

/// A book in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier, immutable once assigned
    pub id: BookId,

    pub title: String,

    pub author: String,

    pub isbn: String,

    pub publication_year: i32,

    #[serde(default)]
    pub genre: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Set once at creation
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a new record from a draft; both timestamps are set to `at`
    pub fn create(id: BookId, draft: &BookDraft, at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let fields = draft.normalized()?;

        Ok(Self {
            id,
            title: fields.title,
            author: fields.author,
            isbn: fields.isbn,
            publication_year: fields.publication_year,
            genre: fields.genre,
            description: fields.description,
            created_at: at,
            updated_at: at,
        })
    }

    /// Replace all mutable fields from a draft, keeping `id` and `created_at`
    pub fn apply(&mut self, draft: &BookDraft, at: DateTime<Utc>) -> Result<(), ValidationError> {
        let fields = draft.normalized()?;

        self.title = fields.title;
        self.author = fields.author;
        self.isbn = fields.isbn;
        self.publication_year = fields.publication_year;
        self.genre = fields.genre;
        self.description = fields.description;
        self.updated_at = at;
        Ok(())
    }
}

/// Required draft fields, named the way users see them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Isbn,
    PublicationYear,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Title => write!(f, "Title"),
            Field::Author => write!(f, "Author"),
            Field::Isbn => write!(f, "ISBN"),
            Field::PublicationYear => write!(f, "Publication year"),
        }
    }
}

/// Why a draft was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(Field),

    #[error("Publication year must be positive (got {0})")]
    NonPositiveYear(i32),
}

/// In-progress field values for a book that has not been saved yet.
///
/// This is also the request body shape of the REST service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub isbn: String,

    /// `None` while the user has not entered a year
    #[serde(default)]
    pub publication_year: Option<i32>,

    #[serde(default)]
    pub genre: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl Default for BookDraft {
    /// Empty fields, publication year preset to the current year
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            isbn: String::new(),
            publication_year: Some(Utc::now().year()),
            genre: None,
            description: None,
        }
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            publication_year: Some(book.publication_year),
            genre: book.genre.clone(),
            description: book.description.clone(),
        }
    }
}

/// Draft fields after validation and trimming
struct NormalizedFields {
    title: String,
    author: String,
    isbn: String,
    publication_year: i32,
    genre: Option<String>,
    description: Option<String>,
}

impl BookDraft {
    /// Create a draft with all required fields set
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        publication_year: i32,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            publication_year: Some(publication_year),
            genre: None,
            description: None,
        }
    }

    /// Set the genre
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check that every required field is present
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.normalized().map(|_| ())
    }

    fn normalized(&self) -> Result<NormalizedFields, ValidationError> {
        let title = required(&self.title, Field::Title)?;
        let author = required(&self.author, Field::Author)?;
        let isbn = required(&self.isbn, Field::Isbn)?;

        let publication_year = self
            .publication_year
            .ok_or(ValidationError::Missing(Field::PublicationYear))?;
        if publication_year <= 0 {
            return Err(ValidationError::NonPositiveYear(publication_year));
        }

        Ok(NormalizedFields {
            title,
            author,
            isbn,
            publication_year,
            genre: optional(self.genre.as_deref()),
            description: optional(self.description.as_deref()),
        })
    }
}

fn required(value: &str, field: Field) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> BookDraft {
        BookDraft::new("Dune", "Frank Herbert", "123", 1965).with_genre("SciFi")
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut draft = dune();
        draft.title = "   ".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::Missing(Field::Title)));

        let mut draft = dune();
        draft.isbn.clear();
        assert_eq!(draft.validate(), Err(ValidationError::Missing(Field::Isbn)));

        let mut draft = dune();
        draft.publication_year = None;
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Missing(Field::PublicationYear))
        );
    }

    #[test]
    fn test_validate_rejects_non_positive_year() {
        let mut draft = dune();
        draft.publication_year = Some(0);
        assert_eq!(draft.validate(), Err(ValidationError::NonPositiveYear(0)));
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::Missing(Field::Title).to_string(),
            "Title is required"
        );
        assert_eq!(
            ValidationError::Missing(Field::Isbn).to_string(),
            "ISBN is required"
        );
    }

    #[test]
    fn test_create_trims_and_drops_blank_optionals() {
        let draft = BookDraft::new("  Dune ", "Frank Herbert", "123", 1965)
            .with_genre("SciFi")
            .with_description("   ");
        let now = Utc::now();

        let book = Book::create(BookId(7), &draft, now).unwrap();
        assert_eq!(book.id, BookId(7));
        assert_eq!(book.title, "Dune");
        assert_eq!(book.genre.as_deref(), Some("SciFi"));
        assert_eq!(book.description, None);
        assert_eq!(book.created_at, book.updated_at);
    }

    #[test]
    fn test_apply_preserves_identity() {
        let created = Utc::now();
        let mut book = Book::create(BookId(1), &dune(), created).unwrap();

        let later = created + chrono::Duration::seconds(5);
        let draft = BookDraft::new("Dune Messiah", "Frank Herbert", "456", 1969);
        book.apply(&draft, later).unwrap();

        assert_eq!(book.id, BookId(1));
        assert_eq!(book.created_at, created);
        assert_eq!(book.updated_at, later);
        assert_eq!(book.title, "Dune Messiah");
        assert_eq!(book.genre, None);
    }

    #[test]
    fn test_apply_invalid_draft_leaves_book_untouched() {
        let created = Utc::now();
        let mut book = Book::create(BookId(1), &dune(), created).unwrap();
        let before = book.clone();

        let mut draft = dune();
        draft.author.clear();
        assert!(book.apply(&draft, Utc::now()).is_err());
        assert_eq!(book, before);
    }

    #[test]
    fn test_book_json_uses_camel_case() {
        let book = Book::create(BookId(3), &dune(), Utc::now()).unwrap();
        let json = serde_json::to_value(&book).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["publicationYear"], 1965);
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_string());
    }

    #[test]
    fn test_book_parses_service_payload() {
        let json = r#"{
            "id": 1,
            "title": "The Great Gatsby",
            "author": "F. Scott Fitzgerald",
            "isbn": "978-0-7432-7356-5",
            "publicationYear": 1925,
            "genre": "Fiction",
            "createdAt": "2023-12-07T10:00:00",
            "updatedAt": "2023-12-07T10:00:00"
        }"#;

        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.id, BookId(1));
        assert_eq!(book.description, None);
        assert_eq!(book.created_at, book.updated_at);
    }

    #[test]
    fn test_draft_from_book() {
        let book = Book::create(BookId(1), &dune(), Utc::now()).unwrap();
        let draft = BookDraft::from(&book);
        assert_eq!(draft, dune());
    }

    #[test]
    fn test_default_draft_uses_current_year() {
        let draft = BookDraft::default();
        assert_eq!(draft.publication_year, Some(Utc::now().year()));
        assert!(draft.title.is_empty());
    }

    #[test]
    fn test_book_id_parse() {
        assert_eq!(" 42 ".parse::<BookId>().unwrap(), BookId(42));
        assert!("abc".parse::<BookId>().is_err());
    }
}
