//! HTTP book service over a [`MemoryStore`].
//!
//! Serves the REST surface that [`HttpStore`](crate::store::HttpStore)
//! consumes, below a configurable base path (default `/api`):
//!
//! - `GET    /books[?author=|?genre=]`: list books
//! - `GET    /books/stats`: total count
//! - `GET    /books/{id}`: one book
//! - `POST   /books`: create (201; 400 invalid; 409 duplicate ISBN)
//! - `PUT    /books/{id}`: update (400 invalid; 404 missing)
//! - `DELETE /books/{id}`: delete (404 missing)
//!
//! Every body is an [`Envelope`], including rejections of malformed ids,
//! query strings and JSON bodies.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::domain::{Book, BookDraft, BookId, Envelope};
use crate::store::{CatalogError, CatalogStore, ListFilter, MemoryStore};

/// Default base path for all routes
pub const DEFAULT_BASE_PATH: &str = "/api";

type Reply<T> = (StatusCode, Json<Envelope<T>>);

/// Query parameters for `GET /books`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl ListParams {
    /// Author wins over genre; blank values are ignored
    pub fn into_filter(self) -> ListFilter {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        match (non_blank(self.author), non_blank(self.genre)) {
            (Some(author), _) => ListFilter::Author(author),
            (None, Some(genre)) => ListFilter::Genre(genre),
            (None, None) => ListFilter::All,
        }
    }
}

/// Build the service router for `store`
pub fn router(store: Arc<MemoryStore>, base_path: &str) -> Router {
    let books = Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/stats", get(book_stats))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store);

    let base = normalize_base_path(base_path);
    let app = if base.is_empty() {
        books
    } else {
        Router::new().nest(&base, books)
    };

    app.layer(CorsLayer::permissive())
}

/// `api/` -> `/api`, `/` -> `` (serve at the root)
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Bind `addr` and serve until the task is dropped
pub async fn serve(addr: &str, base_path: &str, store: Arc<MemoryStore>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve_on(listener, base_path, store).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, base_path: &str, store: Arc<MemoryStore>) -> Result<()> {
    let local = listener.local_addr().context("Listener has no local address")?;
    info!(
        "Book service listening on http://{}{}",
        local,
        normalize_base_path(base_path)
    );

    axum::serve(listener, router(store, base_path))
        .await
        .context("Book service stopped with an error")
}

fn success<T>(status: StatusCode, message: &str, data: T) -> Reply<T> {
    (status, Json(Envelope::success(message, data)))
}

fn rejected<T>(status: StatusCode, message: String) -> Reply<T> {
    debug!(%status, %message, "Request rejected");
    (status, Json(Envelope::error(message)))
}

fn book_id<T>(path: Result<Path<i64>, PathRejection>) -> Result<BookId, Reply<T>> {
    path.map(|Path(id)| BookId(id))
        .map_err(|r| rejected(r.status(), r.body_text()))
}

fn draft_body<T>(body: Result<Json<BookDraft>, JsonRejection>) -> Result<BookDraft, Reply<T>> {
    body.map(|Json(draft)| draft)
        .map_err(|r| rejected(r.status(), r.body_text()))
}

fn failure<T>(error: &CatalogError) -> Reply<T> {
    let status = match error {
        CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Api { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        CatalogError::Transport(_) | CatalogError::Decode(_) => StatusCode::BAD_GATEWAY,
    };
    debug!(%status, error = %error, "Request failed");
    (status, Json(Envelope::error(error.user_message())))
}

async fn list_books(
    State(store): State<Arc<MemoryStore>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Reply<Vec<Book>> {
    let Query(params) = match params {
        Ok(params) => params,
        Err(r) => return rejected(r.status(), r.body_text()),
    };

    match store.list(&params.into_filter()).await {
        Ok(books) => success(StatusCode::OK, "Books retrieved successfully", books),
        Err(e) => failure(&e),
    }
}

async fn get_book(
    State(store): State<Arc<MemoryStore>>,
    path: Result<Path<i64>, PathRejection>,
) -> Reply<Book> {
    let id = match book_id(path) {
        Ok(id) => id,
        Err(reply) => return reply,
    };

    match store.get(id).await {
        Ok(book) => success(StatusCode::OK, "Book found", book),
        Err(e) => failure(&e),
    }
}

async fn create_book(
    State(store): State<Arc<MemoryStore>>,
    body: Result<Json<BookDraft>, JsonRejection>,
) -> Reply<Book> {
    let draft = match draft_body(body) {
        Ok(draft) => draft,
        Err(reply) => return reply,
    };

    match store.create_with_unique_isbn(&draft) {
        Ok(Some(book)) => success(StatusCode::CREATED, "Book created successfully", book),
        Ok(None) => (
            StatusCode::CONFLICT,
            Json(Envelope::error("Book with this ISBN already exists")),
        ),
        Err(e) => failure(&e),
    }
}

async fn update_book(
    State(store): State<Arc<MemoryStore>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<BookDraft>, JsonRejection>,
) -> Reply<Book> {
    let (id, draft) = match (book_id(path), draft_body(body)) {
        (Ok(id), Ok(draft)) => (id, draft),
        (Err(reply), _) | (_, Err(reply)) => return reply,
    };

    match store.update(id, &draft).await {
        Ok(book) => success(StatusCode::OK, "Book updated successfully", book),
        Err(e) => failure(&e),
    }
}

async fn delete_book(
    State(store): State<Arc<MemoryStore>>,
    path: Result<Path<i64>, PathRejection>,
) -> Reply<()> {
    let id = match book_id(path) {
        Ok(id) => id,
        Err(reply) => return reply,
    };

    match store.remove(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(Envelope::empty("Book deleted successfully")),
        ),
        Err(e) => failure(&e),
    }
}

async fn book_stats(State(store): State<Arc<MemoryStore>>) -> Reply<u64> {
    match store.stats().await {
        Ok(total) => success(StatusCode::OK, "Total books count", total),
        Err(e) => failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/api"), "/api");
        assert_eq!(normalize_base_path("api/"), "/api");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path(""), "");
        assert_eq!(normalize_base_path("/v1/api/"), "/v1/api");
    }

    #[test]
    fn test_list_params_precedence() {
        let params = ListParams {
            author: Some("Orwell".into()),
            genre: Some("Fiction".into()),
        };
        assert_eq!(params.into_filter(), ListFilter::Author("Orwell".into()));

        let params = ListParams {
            author: Some("  ".into()),
            genre: Some("Fiction".into()),
        };
        assert_eq!(params.into_filter(), ListFilter::Genre("Fiction".into()));

        assert_eq!(ListParams::default().into_filter(), ListFilter::All);
    }
}
