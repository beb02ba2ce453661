//! REST catalog backing.
//!
//! Each operation maps to exactly one request against the book service:
//!
//! ```text
//! GET    /books[?author=|?genre=]   list
//! GET    /books/{id}                get
//! POST   /books                     create
//! PUT    /books/{id}                update
//! DELETE /books/{id}                remove
//! GET    /books/stats               stats
//! ```
//!
//! Every response body is an [`Envelope`]. Non-2xx responses surface as
//! [`CatalogError::Api`] with the server's message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Book, BookDraft, BookId, Envelope};

use super::{CatalogError, CatalogResult, CatalogStore, ListFilter};

/// Default service location
pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";

/// Catalog served by a remote book service
pub struct HttpStore {
    /// Base URL without trailing slash, e.g. `http://localhost:8080/api`
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpStore {
    /// Create a store for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a store whose requests give up after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> CatalogResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a store using an existing client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a URL below the base
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn book_url(&self, id: BookId) -> String {
        self.url(&format!("books/{}", id))
    }

    /// Send a request and unwrap its envelope; `Ok(None)` when `data` is null
    async fn send<T>(&self, request: RequestBuilder) -> CatalogResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| CatalogError::Decode(format!("{} (status {})", e, status)))?;

        if !envelope.success {
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: envelope.message,
            });
        }

        Ok(envelope.data)
    }

    /// Like [`send`](Self::send) but the response must carry data
    async fn fetch<T>(&self, request: RequestBuilder) -> CatalogResult<T>
    where
        T: DeserializeOwned,
    {
        self.send(request)
            .await?
            .ok_or_else(|| CatalogError::Decode("response envelope has no data".to_string()))
    }
}

/// Error for a non-2xx response, preferring the envelope message
fn api_error(status: StatusCode, body: &str) -> CatalogError {
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .map(|envelope| envelope.message)
        .or_else(|| Some(body.trim().to_string()))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    CatalogError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl CatalogStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn list(&self, filter: &ListFilter) -> CatalogResult<Vec<Book>> {
        let mut request = self.client.get(self.url("books"));
        if let Some(pair) = filter.query_pair() {
            request = request.query(&[pair]);
        }

        let books: Vec<Book> = self.fetch(request).await?;
        debug!(count = books.len(), "Fetched books");
        Ok(books)
    }

    async fn get(&self, id: BookId) -> CatalogResult<Book> {
        self.fetch(self.client.get(self.book_url(id))).await
    }

    async fn create(&self, draft: &BookDraft) -> CatalogResult<Book> {
        draft.validate()?;

        let book: Book = self
            .fetch(self.client.post(self.url("books")).json(draft))
            .await?;
        debug!(id = %book.id, "Book created remotely");
        Ok(book)
    }

    async fn update(&self, id: BookId, draft: &BookDraft) -> CatalogResult<Book> {
        draft.validate()?;

        let book: Book = self
            .fetch(self.client.put(self.book_url(id)).json(draft))
            .await?;
        debug!(%id, "Book updated remotely");
        Ok(book)
    }

    async fn remove(&self, id: BookId) -> CatalogResult<()> {
        self.send::<serde_json::Value>(self.client.delete(self.book_url(id)))
            .await?;
        debug!(%id, "Book removed remotely");
        Ok(())
    }

    async fn stats(&self) -> CatalogResult<u64> {
        self.fetch(self.client.get(self.url("books/stats"))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let store = HttpStore::new("http://localhost:8080/api/");
        assert_eq!(store.base_url(), "http://localhost:8080/api");
        assert_eq!(store.url("books"), "http://localhost:8080/api/books");
        assert_eq!(
            store.book_url(BookId(12)),
            "http://localhost:8080/api/books/12"
        );
        assert_eq!(
            store.url("/books/stats"),
            "http://localhost:8080/api/books/stats"
        );
    }

    #[test]
    fn test_api_error_uses_envelope_message() {
        let body = r#"{"success":false,"message":"Book not found with id: 4","data":null,"timestamp":"2023-12-07T10:00:00"}"#;
        match api_error(StatusCode::NOT_FOUND, body) {
            CatalogError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Book not found with id: 4");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_body_then_reason() {
        match api_error(StatusCode::BAD_GATEWAY, "upstream down\n") {
            CatalogError::Api { message, .. } => assert_eq!(message, "upstream down"),
            other => panic!("Expected Api error, got {other:?}"),
        }

        match api_error(StatusCode::INTERNAL_SERVER_ERROR, "") {
            CatalogError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_draft_rejected_without_request() {
        // Nothing listens on port 9; validation must fail before any I/O
        let store = HttpStore::new("http://127.0.0.1:9/api");
        let mut draft = BookDraft::new("Dune", "Frank Herbert", "123", 1965);
        draft.title.clear();

        let err = store.create(&draft).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }
}
