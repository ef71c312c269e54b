use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::EpubError;

pub(super) const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Upper bound on the uncompressed size of any single entry we read.
pub(super) const MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

/// Read-only view over the ZIP container of an EPUB held in memory.
pub(super) struct EpubArchive<'a> {
    zip: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> EpubArchive<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self, EpubError> {
        if bytes.is_empty() {
            return Err(EpubError::InvalidArchive("empty buffer".to_string()));
        }
        let zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| EpubError::InvalidArchive(e.to_string()))?;
        Ok(Self { zip })
    }

    /// Finds the stored entry name for `path`, tolerating backslash
    /// separators and case differences in either the lookup or the archive.
    fn resolve_entry_name(&self, path: &str) -> Option<String> {
        let wanted = normalize_entry_name(path);
        let mut case_insensitive_match = None;
        for name in self.zip.file_names() {
            let normalized = normalize_entry_name(name);
            if normalized == wanted {
                return Some(name.to_string());
            }
            if case_insensitive_match.is_none() && normalized.eq_ignore_ascii_case(&wanted) {
                case_insensitive_match = Some(name.to_string());
            }
        }
        case_insensitive_match
    }

    /// Reads an entry fully. `Ok(None)` means the entry does not exist.
    pub fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>, EpubError> {
        self.read_limited(path, MAX_ENTRY_BYTES)
    }

    /// Like `read`, but fails with `InvalidArchive` when the entry is larger
    /// than `limit` bytes, whether declared in the header or found while
    /// decompressing.
    fn read_limited(&mut self, path: &str, limit: u64) -> Result<Option<Vec<u8>>, EpubError> {
        let Some(name) = self.resolve_entry_name(path) else {
            return Ok(None);
        };
        let entry = self
            .zip
            .by_name(&name)
            .map_err(|e| EpubError::InvalidArchive(e.to_string()))?;
        if entry.size() > limit {
            return Err(EpubError::InvalidArchive(format!(
                "{} declares {} bytes, limit is {}",
                name,
                entry.size(),
                limit
            )));
        }

        let mut buffer = Vec::new();
        entry
            .take(limit + 1)
            .read_to_end(&mut buffer)
            .map_err(|e| EpubError::InvalidArchive(format!("failed to read {}: {}", name, e)))?;
        if buffer.len() as u64 > limit {
            return Err(EpubError::InvalidArchive(format!(
                "{} expands beyond {} bytes",
                name, limit
            )));
        }
        Ok(Some(buffer))
    }
}

pub(super) fn normalize_entry_name(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Decodes an XML entry, dropping a UTF-8 byte order mark if present.
pub(super) fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_start_matches('\u{feff}').to_string()
}
