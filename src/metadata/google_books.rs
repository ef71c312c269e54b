//! Google Books catalog client, with cover URLs served by Open Library.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use super::models::{VolumeInfo, VolumesResponse};
use super::{BookMetadata, FetchedImage, MetadataError, MetadataProvider};
use crate::epub::DEFAULT_COVER_MEDIA_TYPE;

pub const DEFAULT_CATALOG_API_URL: &str = "https://www.googleapis.com/books/v1";
pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org";

/// Largest image `fetch_image` accepts.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub struct GoogleBooksClient {
    client: reqwest::Client,
    image_client: reqwest::Client,
    base_url: String,
    covers_base_url: String,
    max_image_bytes: usize,
}

impl GoogleBooksClient {
    /// Create a new catalog client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the volumes API (e.g., "https://www.googleapis.com/books/v1")
    /// * `covers_base_url` - Base URL used to build cover image URLs by ISBN
    /// * `timeout_sec` - Timeout for volume lookups
    /// * `image_timeout_sec` - Timeout for image downloads
    pub fn new(
        base_url: String,
        covers_base_url: String,
        timeout_sec: u64,
        image_timeout_sec: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create catalog HTTP client")?;
        let image_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(image_timeout_sec))
            .build()
            .context("Failed to create image HTTP client")?;

        Ok(Self {
            client,
            image_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            covers_base_url: covers_base_url.trim_end_matches('/').to_string(),
            max_image_bytes: MAX_IMAGE_BYTES,
        })
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cover_url(&self, isbn: &str, size: &str) -> Option<String> {
        let clean = isbn.trim().replace('-', "");
        if clean.is_empty() {
            return None;
        }
        Some(format!(
            "{}/b/isbn/{}-{}.jpg",
            self.covers_base_url,
            urlencoding::encode(&clean),
            size
        ))
    }

    fn to_metadata(&self, looked_up_isbn: &str, info: VolumeInfo) -> BookMetadata {
        let title = match (info.title, info.subtitle) {
            (Some(title), Some(subtitle)) if !subtitle.is_empty() => {
                Some(format!("{}: {}", title, subtitle))
            }
            (title, _) => title,
        };

        // ISBN-13 wins over ISBN-10 regardless of listing order.
        let identifier_of = |kind: &str| {
            info.industry_identifiers
                .iter()
                .find(|id| id.kind == kind && !id.identifier.is_empty())
                .map(|id| id.identifier.clone())
        };
        let isbn = identifier_of("ISBN_13")
            .or_else(|| identifier_of("ISBN_10"))
            .unwrap_or_else(|| looked_up_isbn.to_string());

        let description = info
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        BookMetadata {
            title: title.filter(|t| !t.is_empty()),
            authors: info.authors,
            publisher: info.publisher,
            publish_date: info.published_date,
            page_count: info.page_count.filter(|count| *count > 0),
            cover_url: self.cover_url(&isbn, "L"),
            thumbnail_url: self.cover_url(&isbn, "M"),
            edition: None,
            description,
            category: info.categories.first().cloned(),
            categories: info.categories,
            rating_average: info.average_rating,
            rating_count: info.ratings_count,
            isbn,
        }
    }
}

#[async_trait]
impl MetadataProvider for GoogleBooksClient {
    async fn lookup_isbn(&self, isbn: &str) -> Result<BookMetadata, MetadataError> {
        let isbn = isbn.trim().replace('-', "");
        if isbn.is_empty() {
            return Err(MetadataError::MissingIsbn);
        }

        let url = format!("{}/volumes", self.base_url);
        debug!("Looking up ISBN {} at {}", isbn, url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", format!("isbn:{}", isbn))])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(MetadataError::UnexpectedStatus(response.status().as_u16()));
        }

        let volumes: VolumesResponse = response.json().await?;
        if volumes.total_items == 0 {
            return Err(MetadataError::NotFound(isbn));
        }
        let volume = volumes
            .items
            .into_iter()
            .next()
            .ok_or_else(|| MetadataError::NotFound(isbn.clone()))?;

        Ok(self.to_metadata(&isbn, volume.volume_info))
    }

    async fn fetch_image(&self, url: &str) -> Result<FetchedImage, MetadataError> {
        let mut response = self.image_client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(MetadataError::UnexpectedStatus(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_COVER_MEDIA_TYPE)
            .to_string();

        let limit = self.max_image_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(MetadataError::TooLarge(limit));
        }
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > limit {
                return Err(MetadataError::TooLarge(limit));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}
