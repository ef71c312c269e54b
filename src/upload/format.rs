use std::path::Path;

use super::UploadError;
use crate::book_store::BookFormat;

const EPUB_MIME: &str = "application/epub+zip";
const PDF_MIME: &str = "application/pdf";

/// Decides the book format from the file extension or the declared content
/// type; either one is enough. EPUB wins when both formats are hinted.
pub fn classify_upload(
    filename: &str,
    content_type: Option<&str>,
) -> Result<BookFormat, UploadError> {
    let ext = Path::new(filename.trim())
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let content_type = content_type.map(|c| c.trim().to_ascii_lowercase());

    let ext_is = |expected: &str| ext.as_deref() == Some(expected);
    let mime_is = |expected: &str| {
        content_type
            .as_deref()
            .is_some_and(|c| c.starts_with(expected))
    };

    if ext_is("epub") || mime_is(EPUB_MIME) {
        Ok(BookFormat::Epub)
    } else if ext_is("pdf") || mime_is(PDF_MIME) {
        Ok(BookFormat::Pdf)
    } else {
        Err(UploadError::UnsupportedFormat)
    }
}

/// Default title for a book: the file name without its extension.
pub fn title_from_filename(filename: &str) -> String {
    let path = Path::new(filename);
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(filename)
        .to_string()
}
