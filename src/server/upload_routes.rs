//! Upload HTTP route.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use super::book_routes::error_response;
use crate::server::metrics::record_error;
use crate::server::session::Session;
use crate::server::state::{GuardedUploadOrchestrator, ServerState};
use crate::upload::{UploadError, UploadRequest};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: String,
    pub title: String,
    pub no_isbn_found: bool,
}

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<UploadedFile>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Failed to read multipart body: {}", e);
                return Err(error_response(e.status(), e.body_text()));
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        match field.bytes().await {
            Ok(bytes) => {
                return Ok(Some(UploadedFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                }))
            }
            Err(e) => {
                warn!("Failed to read file data: {}", e);
                return Err(error_response(e.status(), "Failed to read file"));
            }
        }
    }
}

/// POST /upload - Upload an EPUB or PDF (multipart/form-data, field `file`)
async fn upload_book(
    session: Session,
    State(orchestrator): State<GuardedUploadOrchestrator>,
    mut multipart: Multipart,
) -> Response {
    let file = match read_file_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, "No file provided"),
        Err(response) => return response,
    };

    if file.filename.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No filename provided");
    }
    if file.bytes.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No file data provided");
    }

    debug!(
        "User {} uploading {} ({} bytes)",
        session.user_id,
        file.filename,
        file.bytes.len()
    );

    let request = UploadRequest {
        filename: file.filename,
        content_type: file.content_type,
        bytes: file.bytes,
        uploaded_by: Some(session.email),
    };

    match orchestrator.upload(request).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(UploadResponse {
                id: outcome.id,
                title: outcome.title,
                no_isbn_found: outcome.no_isbn_found,
            }),
        )
            .into_response(),
        Err(e @ UploadError::UnsupportedFormat) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            error!("Upload failed: {}", e);
            record_error("upload", "upload");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub fn upload_routes(max_upload_bytes: usize) -> Router<ServerState> {
    Router::new()
        .route("/upload", post(upload_book))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
