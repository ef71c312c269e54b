use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub media_path: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub jwt_secret: Option<String>,
    pub max_upload_mb: Option<usize>,

    pub catalog: Option<CatalogConfig>,
}

/// `[catalog]` section: the bibliographic API used for ISBN lookups.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_url: Option<String>,
    pub covers_url: Option<String>,
    pub timeout_sec: Option<u64>,
    pub cover_fetch_timeout_sec: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
