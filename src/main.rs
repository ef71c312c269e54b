use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bookshelf_server::book_store::SqliteBookStore;
use bookshelf_server::config;
use bookshelf_server::metadata::GoogleBooksClient;
use bookshelf_server::object_store::FsObjectStore;
use bookshelf_server::server::{metrics, run_server, RequestsLoggingLevel, ServerState};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory containing the books database. Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// Directory where uploaded files and covers are stored. Defaults to <db-dir>/media.
    #[clap(long, value_parser = parse_path)]
    pub media_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Secret used to sign and validate bearer tokens.
    #[clap(long)]
    pub jwt_secret: Option<String>,

    /// Maximum accepted upload size in megabytes.
    #[clap(long, default_value_t = config::DEFAULT_MAX_UPLOAD_MB)]
    pub max_upload_mb: usize,

    /// Base URL of the book catalog API used for ISBN lookups.
    #[clap(long)]
    pub catalog_api_url: Option<String>,

    /// Base URL of the cover image service.
    #[clap(long)]
    pub covers_url: Option<String>,

    /// Timeout in seconds for catalog lookups.
    #[clap(long, default_value_t = config::DEFAULT_CATALOG_TIMEOUT_SEC)]
    pub catalog_timeout_sec: u64,

    /// Timeout in seconds for downloading catalog cover images.
    #[clap(long, default_value_t = config::DEFAULT_COVER_FETCH_TIMEOUT_SEC)]
    pub cover_fetch_timeout_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            media_path: args.media_path.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            jwt_secret: args.jwt_secret.clone(),
            max_upload_mb: args.max_upload_mb,
            catalog_api_url: args.catalog_api_url.clone(),
            covers_url: args.covers_url.clone(),
            catalog_timeout_sec: args.catalog_timeout_sec,
            cover_fetch_timeout_sec: args.cover_fetch_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  media_path: {:?}", app_config.media_path);
    info!("  port: {}", app_config.port);
    info!("  catalog: {}", app_config.catalog.api_url);
    info!("  max upload: {} MB", app_config.max_upload_mb);

    info!("Initializing metrics...");
    metrics::init_metrics();

    let book_store = Arc::new(SqliteBookStore::open(&app_config.books_db_path())?);

    std::fs::create_dir_all(&app_config.media_path).with_context(|| {
        format!(
            "Failed to create media directory {:?}",
            app_config.media_path
        )
    })?;
    let object_store = Arc::new(FsObjectStore::new(&app_config.media_path));

    let catalog = Arc::new(GoogleBooksClient::new(
        app_config.catalog.api_url.clone(),
        app_config.catalog.covers_url.clone(),
        app_config.catalog.timeout_sec,
        app_config.catalog.cover_fetch_timeout_sec,
    )?);

    let state = ServerState::new(
        app_config.server_config(),
        book_store,
        object_store,
        catalog,
    );

    run_server(state).await
}
