use thiserror::Error;

/// Errors that can occur while inspecting an EPUB archive.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EpubError {
    #[error("Not a valid EPUB archive: {0}")]
    InvalidArchive(String),

    #[error("META-INF/container.xml not found")]
    ContainerNotFound,

    #[error("Malformed container.xml: {0}")]
    MalformedContainer(String),

    #[error("Package document not found in archive: {0}")]
    PackageNotFound(String),

    #[error("Malformed package document: {0}")]
    MalformedPackage(String),

    #[error("No valid ISBN in package metadata")]
    IsbnNotFound,

    #[error("No cover meta entry in package metadata")]
    CoverMetaNotFound,

    #[error("Cover manifest item not found: {0}")]
    CoverItemNotFound(String),

    #[error("Cover file not found in archive: {0}")]
    CoverFileNotFound(String),
}
