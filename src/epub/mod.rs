//! EPUB metadata inspection.
//!
//! Reads an in-memory EPUB archive and extracts the two things the upload
//! pipeline cares about:
//! - the book's ISBN, from the package document's identifiers
//! - the designated cover image, resolved through the package manifest
//!
//! Everything here is synchronous and works on a borrowed byte buffer only.

mod archive;
mod cover;
mod error;
mod isbn;
mod package;

#[cfg(test)]
pub(crate) mod test_support;

pub use cover::{extract_cover, ExtractedCover, DEFAULT_COVER_MEDIA_TYPE};
pub use error::EpubError;
pub use isbn::{extract_isbn, normalize_isbn};
