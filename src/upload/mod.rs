//! Upload pipeline: store the file, enrich it from the catalog and the
//! embedded cover, persist the resulting book record.

mod format;
mod orchestrator;

pub use format::{classify_upload, title_from_filename};
pub use orchestrator::{UploadOrchestrator, UploadOutcome, UploadRequest};

use crate::object_store::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only EPUB and PDF files are accepted")]
    UnsupportedFormat,

    #[error("Failed to store uploaded file: {0}")]
    StorageUploadFailed(#[source] StorageError),

    #[error("Failed to save book record: {0}")]
    PersistFailed(String),
}
