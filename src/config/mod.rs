mod file_config;

pub use file_config::{CatalogConfig, FileConfig};

use crate::metadata::{DEFAULT_CATALOG_API_URL, DEFAULT_COVERS_URL};
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// Placeholder shipped in sample configs, rejected at startup.
pub const PLACEHOLDER_JWT_SECRET: &str = "change-me-in-production";

pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_CATALOG_TIMEOUT_SEC: u64 = 15;
pub const DEFAULT_COVER_FETCH_TIMEOUT_SEC: u64 = 10;

/// Trims a configured token secret and rejects empty or placeholder values.
/// The server and `cli-token` both go through here so their keys match.
pub fn normalize_jwt_secret(raw: &str) -> Result<String> {
    let secret = raw.trim();
    if secret.is_empty() {
        bail!("jwt_secret must not be empty");
    }
    if secret == PLACEHOLDER_JWT_SECRET {
        bail!("jwt_secret is still set to the placeholder value, pick a real secret");
    }
    Ok(secret.to_string())
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub media_path: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub jwt_secret: Option<String>,
    pub max_upload_mb: usize,
    pub catalog_api_url: Option<String>,
    pub covers_url: Option<String>,
    pub catalog_timeout_sec: u64,
    pub cover_fetch_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            media_path: None,
            port: 3001,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            frontend_dir_path: None,
            jwt_secret: None,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            catalog_api_url: None,
            covers_url: None,
            catalog_timeout_sec: DEFAULT_CATALOG_TIMEOUT_SEC,
            cover_fetch_timeout_sec: DEFAULT_COVER_FETCH_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub media_path: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub jwt_secret: String,
    pub max_upload_mb: usize,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    pub api_url: String,
    pub covers_url: String,
    pub timeout_sec: u64,
    pub cover_fetch_timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let media_path = file
            .media_path
            .map(PathBuf::from)
            .or_else(|| cli.media_path.clone())
            .unwrap_or_else(|| db_dir.join("media"));

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let jwt_secret = file
            .jwt_secret
            .or_else(|| cli.jwt_secret.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("jwt_secret must be specified via --jwt-secret or in config file")
            })?;
        let jwt_secret = normalize_jwt_secret(&jwt_secret)?;

        let max_upload_mb = file.max_upload_mb.unwrap_or(cli.max_upload_mb);
        if max_upload_mb == 0 {
            bail!("max_upload_mb must be greater than zero");
        }

        let catalog_file = file.catalog.unwrap_or_default();
        let catalog = CatalogSettings {
            api_url: catalog_file
                .api_url
                .or_else(|| cli.catalog_api_url.clone())
                .unwrap_or_else(|| DEFAULT_CATALOG_API_URL.to_string()),
            covers_url: catalog_file
                .covers_url
                .or_else(|| cli.covers_url.clone())
                .unwrap_or_else(|| DEFAULT_COVERS_URL.to_string()),
            timeout_sec: catalog_file.timeout_sec.unwrap_or(cli.catalog_timeout_sec),
            cover_fetch_timeout_sec: catalog_file
                .cover_fetch_timeout_sec
                .unwrap_or(cli.cover_fetch_timeout_sec),
        };

        Ok(Self {
            db_dir,
            media_path,
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            jwt_secret,
            max_upload_mb,
            catalog,
        })
    }

    pub fn books_db_path(&self) -> PathBuf {
        self.db_dir.join("books.db")
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            frontend_dir_path: self.frontend_dir_path.clone(),
            jwt_secret: self.jwt_secret.clone(),
            max_upload_bytes: self.max_upload_bytes(),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
