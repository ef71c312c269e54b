use super::package::{open_package, PackageDocument};
use super::EpubError;

const ISBN_SCHEMES: &[&str] = &["isbn", "isbn-13", "isbn-10"];
const IDENTIFIER_TYPE_PROPERTIES: &[&str] = &["identifier-type", "scheme"];

fn is_isbn_scheme(value: &str) -> bool {
    let value = value.trim();
    ISBN_SCHEMES.iter().any(|s| value.eq_ignore_ascii_case(s))
}

/// Strips everything but ASCII digits and accepts the result only when it
/// has the length of an ISBN-10 or ISBN-13. No checksum is verified.
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    matches!(digits.len(), 10 | 13).then_some(digits)
}

/// Extracts the ISBN declared in the EPUB's package metadata.
pub fn extract_isbn(epub: &[u8]) -> Result<String, EpubError> {
    let (_, package) = open_package(epub)?;
    find_isbn(&package).ok_or(EpubError::IsbnNotFound)
}

/// Candidates are tried in order of how explicitly they are marked as an
/// ISBN; the first one that normalizes wins.
fn find_isbn(package: &PackageDocument) -> Option<String> {
    let by_scheme = package
        .identifiers
        .iter()
        .filter(|ident| ident.scheme.as_deref().is_some_and(is_isbn_scheme))
        .find_map(|ident| normalize_isbn(&ident.value));
    if by_scheme.is_some() {
        return by_scheme;
    }

    let by_refinement = package
        .metas
        .iter()
        .filter(|meta| {
            meta.property.as_deref().is_some_and(|p| {
                IDENTIFIER_TYPE_PROPERTIES
                    .iter()
                    .any(|expected| p.trim().eq_ignore_ascii_case(expected))
            }) && meta.content.as_deref().is_some_and(is_isbn_scheme)
        })
        .filter_map(|meta| meta.refines.as_deref())
        .map(|refines| refines.trim().trim_start_matches('#'))
        .filter_map(|target| {
            package
                .identifiers
                .iter()
                .find(|ident| ident.id.as_deref() == Some(target))
        })
        .find_map(|ident| normalize_isbn(&ident.value));
    if by_refinement.is_some() {
        return by_refinement;
    }

    let any_identifier = package
        .identifiers
        .iter()
        .find_map(|ident| normalize_isbn(&ident.value));
    if any_identifier.is_some() {
        return any_identifier;
    }

    package
        .loose_identifiers
        .iter()
        .find_map(|value| normalize_isbn(value))
}
