use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metadata::BookMetadata;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    Epub,
    Pdf,
}

impl BookFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookFormat::Epub => "epub",
            BookFormat::Pdf => "pdf",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "epub" => Some(BookFormat::Epub),
            "pdf" => Some(BookFormat::Pdf),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            BookFormat::Epub => "application/epub+zip",
            BookFormat::Pdf => "application/pdf",
        }
    }
}

/// A stored book: the primary file plus whatever metadata enrichment found.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub publish_date: Option<String>,
    pub isbn: Option<String>,
    pub page_count: Option<u32>,
    pub cover_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Object key of the cover image re-hosted in our own storage.
    pub cover_key: Option<String>,
    pub edition: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub categories: Vec<String>,
    pub rating_average: Option<f64>,
    pub rating_count: Option<u32>,
    pub format: BookFormat,
    /// Object key of the primary file. Always set.
    pub storage_key: String,
    pub original_name: String,
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    pub fn new(
        format: BookFormat,
        storage_key: &str,
        original_name: &str,
        title: &str,
        uploaded_by: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            authors: Vec::new(),
            publisher: None,
            publish_date: None,
            isbn: None,
            page_count: None,
            cover_url: None,
            thumbnail_url: None,
            cover_key: None,
            edition: None,
            description: None,
            category: None,
            categories: Vec::new(),
            rating_average: None,
            rating_count: None,
            format,
            storage_key: storage_key.to_string(),
            original_name: original_name.to_string(),
            uploaded_by,
            created_at: Utc::now(),
        }
    }

    /// Overwrites the descriptive fields with catalog metadata. The title is
    /// only replaced when the catalog has one.
    pub fn apply_metadata(&mut self, meta: BookMetadata) {
        if let Some(title) = meta.title.filter(|t| !t.is_empty()) {
            self.title = title;
        }
        if !meta.isbn.is_empty() {
            self.isbn = Some(meta.isbn);
        }
        self.authors = meta.authors;
        self.publisher = meta.publisher;
        self.publish_date = meta.publish_date;
        self.page_count = meta.page_count;
        self.cover_url = meta.cover_url;
        self.thumbnail_url = meta.thumbnail_url;
        self.edition = meta.edition;
        self.description = meta.description;
        self.category = meta.category;
        self.categories = meta.categories;
        self.rating_average = meta.rating_average;
        self.rating_count = meta.rating_count;
    }
}
