//! Object storage for uploaded book files and cover images.

mod fs_store;

pub use fs_store::FsObjectStore;

use async_trait::async_trait;
use thiserror::Error;

/// Key prefix for primary book files.
pub const BOOKS_PREFIX: &str = "books/";
/// Key prefix for cover images.
pub const COVERS_PREFIX: &str = "books/covers/";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under a freshly generated key starting with `prefix`
    /// and ending with the extension of `filename`. Returns the key.
    async fn put(
        &self,
        prefix: &str,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// Removes an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// File extension, with its leading dot, to use when storing a cover of
/// the given media type.
pub fn cover_extension(media_type: &str) -> &'static str {
    if media_type.to_ascii_lowercase().contains("png") {
        ".png"
    } else {
        ".jpg"
    }
}
