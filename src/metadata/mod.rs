//! Book metadata lookup from external catalogs.

mod google_books;
mod models;

pub use google_books::{GoogleBooksClient, DEFAULT_CATALOG_API_URL, DEFAULT_COVERS_URL};
pub use models::{BookMetadata, FetchedImage};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("ISBN is required")]
    MissingIsbn,

    #[error("No volume found for ISBN {0}")]
    NotFound(String),

    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog returned status {0}")]
    UnexpectedStatus(u16),

    #[error("Image exceeds {0} bytes")]
    TooLarge(usize),
}

/// Source of descriptive metadata and cover images.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Resolves the catalog entry for a normalized ISBN.
    async fn lookup_isbn(&self, isbn: &str) -> Result<BookMetadata, MetadataError>;

    /// Downloads an image, typically a cover URL returned by `lookup_isbn`.
    async fn fetch_image(&self, url: &str) -> Result<FetchedImage, MetadataError>;
}
