use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::format::{classify_upload, title_from_filename};
use super::UploadError;
use crate::book_store::{Book, BookFormat, BookStore};
use crate::epub;
use crate::metadata::{BookMetadata, MetadataProvider};
use crate::object_store::{cover_extension, ObjectStore, BOOKS_PREFIX, COVERS_PREFIX};
use crate::server::metrics::{record_enrichment, record_upload};

pub struct UploadRequest {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub id: String,
    pub title: String,
    /// The EPUB carried no usable ISBN, so no catalog lookup happened.
    pub no_isbn_found: bool,
}

/// Result of the ISBN extraction + catalog lookup branch.
enum CatalogLookup {
    Skipped,
    NoIsbn,
    Failed { isbn: String },
    Found(BookMetadata),
}

/// Runs the upload pipeline for a single file.
///
/// The primary file upload, the ISBN lookup and the cover extraction run
/// concurrently on the caller's task. Dropping the returned future stops
/// every branch that has not finished yet.
pub struct UploadOrchestrator {
    object_store: Arc<dyn ObjectStore>,
    book_store: Arc<dyn BookStore>,
    metadata_provider: Arc<dyn MetadataProvider>,
}

impl UploadOrchestrator {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        book_store: Arc<dyn BookStore>,
        metadata_provider: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            object_store,
            book_store,
            metadata_provider,
        }
    }

    pub async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome, UploadError> {
        let start = Instant::now();

        let format = match classify_upload(&request.filename, request.content_type.as_deref()) {
            Ok(format) => format,
            Err(e) => {
                record_upload("unknown", "rejected", start.elapsed());
                return Err(e);
            }
        };

        let result = self.run(format, request).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(UploadError::StorageUploadFailed(_)) => "storage_failed",
            Err(UploadError::PersistFailed(_)) => "persist_failed",
            Err(UploadError::UnsupportedFormat) => "rejected",
        };
        record_upload(format.as_str(), outcome, start.elapsed());
        result
    }

    async fn run(
        &self,
        format: BookFormat,
        request: UploadRequest,
    ) -> Result<UploadOutcome, UploadError> {
        let UploadRequest {
            filename,
            bytes,
            uploaded_by,
            ..
        } = request;
        let bytes: Arc<[u8]> = Arc::from(bytes);

        debug!(
            "Processing upload {} ({} bytes, {})",
            filename,
            bytes.len(),
            format.as_str()
        );

        let store_primary =
            self.object_store
                .put(BOOKS_PREFIX, &filename, &bytes, format.content_type());

        let (primary, lookup, extracted_cover_key) = match format {
            BookFormat::Epub => tokio::join!(
                store_primary,
                self.lookup_catalog(bytes.clone()),
                self.store_embedded_cover(bytes.clone()),
            ),
            BookFormat::Pdf => (store_primary.await, CatalogLookup::Skipped, None),
        };

        let storage_key = primary.map_err(|e| {
            warn!("Failed to store {}: {}", filename, e);
            UploadError::StorageUploadFailed(e)
        })?;

        let mut book = Book::new(
            format,
            &storage_key,
            &filename,
            &title_from_filename(&filename),
            uploaded_by,
        );

        let mut no_isbn_found = false;
        match lookup {
            CatalogLookup::Found(meta) => book.apply_metadata(meta),
            CatalogLookup::Failed { isbn } => book.isbn = Some(isbn),
            CatalogLookup::NoIsbn => no_isbn_found = true,
            CatalogLookup::Skipped => {}
        }

        book.cover_key = match extracted_cover_key {
            Some(key) => Some(key),
            None => match book.cover_url.clone() {
                Some(url) => self.rehost_cover(&url).await,
                None => None,
            },
        };

        self.book_store.insert_book(&book).map_err(|e| {
            warn!(
                "Failed to save record for {} (stored as {}): {:#}",
                filename, storage_key, e
            );
            UploadError::PersistFailed(e.to_string())
        })?;

        info!(
            "Uploaded {} as book {} (isbn: {:?}, cover: {})",
            filename,
            book.id,
            book.isbn,
            book.cover_key.is_some()
        );

        Ok(UploadOutcome {
            id: book.id,
            title: book.title,
            no_isbn_found,
        })
    }

    async fn lookup_catalog(&self, bytes: Arc<[u8]>) -> CatalogLookup {
        let isbn = match tokio::task::spawn_blocking(move || epub::extract_isbn(&bytes)).await {
            Ok(Ok(isbn)) => isbn,
            Ok(Err(e)) => {
                debug!("No ISBN extracted: {}", e);
                record_enrichment("isbn_lookup", "no_isbn");
                return CatalogLookup::NoIsbn;
            }
            Err(e) => {
                warn!("ISBN extraction task failed: {}", e);
                record_enrichment("isbn_lookup", "no_isbn");
                return CatalogLookup::NoIsbn;
            }
        };

        match self.metadata_provider.lookup_isbn(&isbn).await {
            Ok(meta) => {
                debug!("Catalog metadata found for ISBN {}", isbn);
                record_enrichment("isbn_lookup", "success");
                CatalogLookup::Found(meta)
            }
            Err(e) => {
                warn!("Catalog lookup for ISBN {} failed: {}", isbn, e);
                record_enrichment("isbn_lookup", "failed");
                CatalogLookup::Failed { isbn }
            }
        }
    }

    async fn store_embedded_cover(&self, bytes: Arc<[u8]>) -> Option<String> {
        let cover = match tokio::task::spawn_blocking(move || epub::extract_cover(&bytes)).await {
            Ok(Ok(cover)) if !cover.bytes.is_empty() => cover,
            Ok(Ok(_)) => {
                debug!("Embedded cover is empty");
                record_enrichment("cover_extract", "not_found");
                return None;
            }
            Ok(Err(e)) => {
                debug!("No embedded cover: {}", e);
                record_enrichment("cover_extract", "not_found");
                return None;
            }
            Err(e) => {
                warn!("Cover extraction task failed: {}", e);
                record_enrichment("cover_extract", "failed");
                return None;
            }
        };

        let filename = format!("cover{}", cover_extension(&cover.media_type));
        match self
            .object_store
            .put(COVERS_PREFIX, &filename, &cover.bytes, &cover.media_type)
            .await
        {
            Ok(key) => {
                record_enrichment("cover_extract", "success");
                Some(key)
            }
            Err(e) => {
                warn!("Failed to store embedded cover: {}", e);
                record_enrichment("cover_extract", "failed");
                None
            }
        }
    }

    /// Copies a catalog cover into our own storage. On failure the book
    /// keeps pointing at the external URL.
    async fn rehost_cover(&self, url: &str) -> Option<String> {
        let image = match self.metadata_provider.fetch_image(url).await {
            Ok(image) if !image.bytes.is_empty() => image,
            Ok(_) => {
                debug!("Catalog cover at {} is empty", url);
                record_enrichment("cover_rehost", "failed");
                return None;
            }
            Err(e) => {
                debug!("Could not fetch catalog cover {}: {}", url, e);
                record_enrichment("cover_rehost", "failed");
                return None;
            }
        };

        let filename = format!("cover{}", cover_extension(&image.content_type));
        match self
            .object_store
            .put(COVERS_PREFIX, &filename, &image.bytes, &image.content_type)
            .await
        {
            Ok(key) => {
                record_enrichment("cover_rehost", "success");
                Some(key)
            }
            Err(e) => {
                warn!("Failed to store catalog cover: {}", e);
                record_enrichment("cover_rehost", "failed");
                None
            }
        }
    }
}
