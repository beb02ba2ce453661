//! Text search over book lists.
//!
//! Matching is a case-insensitive substring test. A blank term matches
//! everything, so callers never need to special-case an empty search box.

use serde::{Deserialize, Serialize};

use crate::domain::Book;

/// Which field(s) a search term is tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// Title, author or genre
    #[default]
    Any,

    Author,

    Genre,
}

/// Current search input
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,

    #[serde(default)]
    pub field: SearchField,
}

impl SearchQuery {
    /// Search all fields for `term`
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            field: SearchField::Any,
        }
    }

    /// Restrict the search to one field
    pub fn in_field(mut self, field: SearchField) -> Self {
        self.field = field;
        self
    }

    /// True when the query would not narrow anything
    pub fn is_blank(&self) -> bool {
        self.term.trim().is_empty()
    }

    /// Test a single book against this query
    pub fn matches(&self, book: &Book) -> bool {
        if self.is_blank() {
            return true;
        }
        matches_field(book, &self.term.to_lowercase(), self.field)
    }
}

/// Narrow `books` to those matching `query`, preserving order
pub fn filter<'a, I>(books: I, query: &SearchQuery) -> Vec<&'a Book>
where
    I: IntoIterator<Item = &'a Book>,
{
    if query.is_blank() {
        return books.into_iter().collect();
    }

    let term = query.term.to_lowercase();
    books
        .into_iter()
        .filter(|book| matches_field(book, &term, query.field))
        .collect()
}

/// `term` must already be lowercased
fn matches_field(book: &Book, term: &str, field: SearchField) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(term);
    let genre_contains = || book.genre.as_deref().is_some_and(|genre| contains(genre));

    match field {
        SearchField::Any => contains(&book.title) || contains(&book.author) || genre_contains(),
        SearchField::Author => contains(&book.author),
        SearchField::Genre => genre_contains(),
    }
}
