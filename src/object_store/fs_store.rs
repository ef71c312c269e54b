use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use super::{ObjectStore, StorageError, StoredObject};

/// Stores objects as plain files below a root directory, one file per key.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a key to a path under the root, refusing anything that could
    /// escape it.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains('\\') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let relative = Path::new(key);
        let only_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !only_normal {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

fn content_type_from_extension(key: &str) -> Option<&'static str> {
    let ext = Path::new(key).extension()?.to_str()?.to_lowercase();
    let content_type = match ext.as_str() {
        "epub" => "application/epub+zip",
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(content_type)
}

/// Sniffs the stored bytes first; EPUBs sniff as plain ZIP, so the key's
/// extension takes precedence over a generic archive match.
fn detect_content_type(key: &str, bytes: &[u8]) -> String {
    let sniffed = infer::get(bytes).map(|kind| kind.mime_type());
    match (sniffed, content_type_from_extension(key)) {
        (Some("application/zip"), Some(from_ext)) => from_ext.to_string(),
        (Some(mime), _) => mime.to_string(),
        (None, Some(from_ext)) => from_ext.to_string(),
        (None, None) => "application/octet-stream".to_string(),
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        prefix: &str,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = format!("{}{}{}", prefix, Uuid::new_v4(), extension_of(filename));
        let path = self.object_path(&key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        debug!("Stored {} ({} bytes, {})", key, bytes.len(), content_type);
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let path = self.object_path(key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let content_type = detect_content_type(key, &bytes);
        Ok(StoredObject {
            bytes,
            content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
