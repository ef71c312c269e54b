use super::package::open_package;
use super::EpubError;

pub const DEFAULT_COVER_MEDIA_TYPE: &str = "image/jpeg";

/// Cover image pulled out of an EPUB archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCover {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// Extracts the cover image designated by `<meta name="cover">`.
///
/// The meta entry names a manifest item, whose `href` is resolved relative
/// to the package document's directory.
pub fn extract_cover(epub: &[u8]) -> Result<ExtractedCover, EpubError> {
    let (mut archive, package) = open_package(epub)?;

    let cover_id = package
        .metas
        .iter()
        .find(|meta| {
            meta.name
                .as_deref()
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("cover"))
        })
        .and_then(|meta| meta.content.as_deref())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(EpubError::CoverMetaNotFound)?;

    let item = package
        .manifest_item(cover_id)
        .ok_or_else(|| EpubError::CoverItemNotFound(cover_id.to_string()))?;

    let path = resolve_href(package.base_dir(), &item.href);
    let bytes = archive
        .read(&path)?
        .ok_or_else(|| EpubError::CoverFileNotFound(path.clone()))?;

    let media_type = item
        .media_type
        .clone()
        .unwrap_or_else(|| DEFAULT_COVER_MEDIA_TYPE.to_string());

    Ok(ExtractedCover { bytes, media_type })
}

/// Joins a manifest `href` onto the package directory, collapsing `.` and
/// `..` segments. Hrefs are percent-decoded and any fragment is dropped.
fn resolve_href(base_dir: &str, href: &str) -> String {
    let raw = href.split('#').next().unwrap_or_default().replace('\\', "/");
    let href = match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.clone(),
    };

    let joined = if href.starts_with('/') {
        href
    } else {
        format!("{}{}", base_dir, href)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
