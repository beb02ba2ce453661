//! Domain types for the book catalog.
//!
//! - Book: the catalog record and the draft it is created from
//! - Envelope: the REST response wrapper
//! - timestamp: wire format for record timestamps

pub mod book;
pub mod envelope;
pub mod timestamp;

pub use book::{Book, BookDraft, BookId, Field, ValidationError};
pub use envelope::Envelope;
