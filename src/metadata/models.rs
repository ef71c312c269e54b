use serde::{Deserialize, Serialize};

/// Normalized descriptive metadata for a book.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub publish_date: Option<String>,
    pub isbn: String,
    pub page_count: Option<u32>,
    pub cover_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub edition: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub categories: Vec<String>,
    pub rating_average: Option<f64>,
    pub rating_count: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

// =============================================================================
// Google Books API response types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct VolumesResponse {
    pub total_items: u32,
    pub items: Vec<Volume>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct Volume {
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub page_count: Option<u32>,
    pub categories: Vec<String>,
    pub industry_identifiers: Vec<IndustryIdentifier>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}
