//! Book library HTTP routes.
//!
//! Provides endpoints for:
//! - Listing and fetching book records
//! - Streaming the stored file and cover
//! - Refreshing metadata from the catalog
//! - Deleting a book together with its stored objects

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::book_store::Book;
use crate::metadata::MetadataError;
use crate::object_store::StorageError;
use crate::server::metrics::record_error;
use crate::server::session::Session;
use crate::server::state::{
    GuardedBookStore, GuardedMetadataProvider, GuardedObjectStore, ServerState,
};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(super) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// A book as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    #[serde(flatten)]
    pub book: Book,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_cover_url: Option<String>,
}

impl From<Book> for BookResponse {
    fn from(mut book: Book) -> Self {
        let extracted_cover_url = book
            .cover_key
            .as_ref()
            .map(|_| format!("/v1/books/{}/cover", book.id));

        if let Some(url) = &extracted_cover_url {
            if book.cover_url.as_deref().map_or(true, str::is_empty) {
                book.cover_url = Some(url.clone());
            }
            if book.thumbnail_url.as_deref().map_or(true, str::is_empty) {
                book.thumbnail_url = Some(url.clone());
            }
        }

        BookResponse {
            book,
            extracted_cover_url,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshMetadataBody {
    #[serde(default)]
    pub isbn: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

fn load_book(store: &GuardedBookStore, id: &str) -> Result<Book, Response> {
    match store.get_book(id) {
        Ok(Some(book)) => Ok(book),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "Book not found")),
        Err(e) => {
            error!("Failed to load book {}: {:#}", id, e);
            record_error("database", "books");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load book",
            ))
        }
    }
}

/// Builds a `Content-Disposition: attachment` value. The plain `filename`
/// parameter is quoted and escaped, `filename*` carries the UTF-8 form.
fn content_disposition(original_name: &str) -> HeaderValue {
    let escaped: String = original_name
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        escaped,
        urlencoding::encode(original_name)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// ISBN to refresh with: the requested one, else the stored one. Blank
/// values count as missing.
fn refresh_isbn(requested: Option<&str>, stored: Option<&str>) -> Option<String> {
    let clean = |isbn: &str| Some(isbn.trim().replace('-', "")).filter(|i| !i.is_empty());
    requested.and_then(clean).or_else(|| stored.and_then(clean))
}

fn object_response(bytes: Vec<u8>, content_type: &str) -> Response {
    let mut response = Response::new(Body::from(bytes));
    if let Ok(value) = HeaderValue::from_str(content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

fn storage_error_response(key: &str, e: StorageError) -> Response {
    match e {
        StorageError::NotFound(_) => {
            warn!("Stored object {} is missing", key);
            error_response(StatusCode::NOT_FOUND, "Stored file not found")
        }
        e => {
            error!("Failed to read stored object {}: {}", key, e);
            record_error("storage", "books");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read stored file",
            )
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /books - All books, newest first
async fn list_books(_session: Session, State(store): State<GuardedBookStore>) -> Response {
    match store.list_books() {
        Ok(books) => {
            let books: Vec<BookResponse> = books.into_iter().map(BookResponse::from).collect();
            Json(books).into_response()
        }
        Err(e) => {
            error!("Failed to list books: {:#}", e);
            record_error("database", "books");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list books")
        }
    }
}

/// GET /books/{id}
async fn get_book(
    _session: Session,
    State(store): State<GuardedBookStore>,
    Path(id): Path<String>,
) -> Response {
    match load_book(&store, &id) {
        Ok(book) => Json(BookResponse::from(book)).into_response(),
        Err(response) => response,
    }
}

/// GET /books/{id}/cover - Unauthenticated so it can back an `<img src>`
async fn get_cover(
    State(store): State<GuardedBookStore>,
    State(objects): State<GuardedObjectStore>,
    Path(id): Path<String>,
) -> Response {
    let book = match load_book(&store, &id) {
        Ok(book) => book,
        Err(response) => return response,
    };
    let Some(cover_key) = book.cover_key else {
        return error_response(StatusCode::NOT_FOUND, "Book has no stored cover");
    };

    match objects.get(&cover_key).await {
        Ok(object) => object_response(object.bytes, &object.content_type),
        Err(e) => storage_error_response(&cover_key, e),
    }
}

/// GET /books/{id}/file - Download the original upload
async fn get_file(
    session: Session,
    State(store): State<GuardedBookStore>,
    State(objects): State<GuardedObjectStore>,
    Path(id): Path<String>,
) -> Response {
    let book = match load_book(&store, &id) {
        Ok(book) => book,
        Err(response) => return response,
    };

    debug!("User {} downloading book {}", session.user_id, book.id);
    match objects.get(&book.storage_key).await {
        Ok(object) => {
            let mut response = object_response(object.bytes, book.format.content_type());
            response.headers_mut().insert(
                header::CONTENT_DISPOSITION,
                content_disposition(&book.original_name),
            );
            response
        }
        Err(e) => storage_error_response(&book.storage_key, e),
    }
}

/// POST /books/{id}/metadata - Re-run the catalog lookup
async fn refresh_metadata(
    session: Session,
    State(store): State<GuardedBookStore>,
    State(provider): State<GuardedMetadataProvider>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshMetadataBody::default()
    } else {
        match serde_json::from_slice::<RefreshMetadataBody>(&body) {
            Ok(request) => request,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("Invalid body: {}", e))
            }
        }
    };

    let mut book = match load_book(&store, &id) {
        Ok(book) => book,
        Err(response) => return response,
    };

    let Some(isbn) = refresh_isbn(request.isbn.as_deref(), book.isbn.as_deref()) else {
        return error_response(StatusCode::BAD_REQUEST, "No ISBN available for lookup");
    };

    let meta = match provider.lookup_isbn(&isbn).await {
        Ok(meta) => meta,
        Err(e) => {
            warn!("Metadata refresh for book {} failed: {}", id, e);
            let message = match e {
                MetadataError::NotFound(_) => format!("No catalog entry for ISBN {}", isbn),
                _ => format!("Catalog lookup failed: {}", e),
            };
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    book.apply_metadata(meta);
    match store.update_book_metadata(&book) {
        Ok(true) => {
            info!(
                "User {} refreshed metadata of book {} from ISBN {}",
                session.user_id, book.id, isbn
            );
            Json(BookResponse::from(book)).into_response()
        }
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Book not found"),
        Err(e) => {
            error!("Failed to update book {}: {:#}", id, e);
            record_error("database", "books");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update book")
        }
    }
}

/// DELETE /books/{id}
async fn delete_book(
    session: Session,
    State(store): State<GuardedBookStore>,
    State(objects): State<GuardedObjectStore>,
    Path(id): Path<String>,
) -> Response {
    let book = match store.delete_book(&id) {
        Ok(Some(book)) => book,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Book not found"),
        Err(e) => {
            error!("Failed to delete book {}: {:#}", id, e);
            record_error("database", "books");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete book");
        }
    };

    for key in std::iter::once(&book.storage_key).chain(book.cover_key.iter()) {
        if let Err(e) = objects.delete(key).await {
            warn!("Failed to delete stored object {}: {}", key, e);
        }
    }

    info!("User {} deleted book {}", session.user_id, book.id);
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Router
// =============================================================================

pub fn book_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_books))
        .route("/{id}", get(get_book).delete(delete_book))
        .route("/{id}/cover", get(get_cover))
        .route("/{id}/file", get(get_file))
        .route("/{id}/metadata", post(refresh_metadata))
}
