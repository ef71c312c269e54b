//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database, media directory
//! and mock catalog.

use super::constants::*;
use super::mock_catalog::MockCatalog;
use bookshelf_server::book_store::{BookStore, SqliteBookStore};
use bookshelf_server::metadata::GoogleBooksClient;
use bookshelf_server::object_store::FsObjectStore;
use bookshelf_server::server::{make_app, RequestsLoggingLevel, ServerConfig, ServerState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated storage
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Book store for direct database access in tests
    pub book_store: Arc<SqliteBookStore>,

    /// Root directory of the object store
    pub media_path: PathBuf,

    /// The mock catalog the server talks to
    pub catalog: MockCatalog,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    pub async fn spawn() -> Self {
        Self::spawn_with_upload_limit(TEST_MAX_UPLOAD_BYTES).await
    }

    /// Spawns a new test server that rejects uploads above `max_upload_bytes`
    ///
    /// # Panics
    ///
    /// Panics if storage cannot be created, the port cannot be bound or the
    /// server doesn't become ready within timeout.
    pub async fn spawn_with_upload_limit(max_upload_bytes: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let media_path = temp_dir.path().join("media");
        std::fs::create_dir_all(&media_path).expect("Failed to create media dir");

        let book_store = Arc::new(
            SqliteBookStore::open(&temp_dir.path().join("books.db"))
                .expect("Failed to open book store"),
        );
        let object_store = Arc::new(FsObjectStore::new(&media_path));

        let catalog = MockCatalog::spawn().await;
        let catalog_client = Arc::new(
            GoogleBooksClient::new(catalog.base_url.clone(), catalog.base_url.clone(), 5, 5)
                .expect("Failed to build catalog client"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            max_upload_bytes,
            ..Default::default()
        };
        let state = ServerState::new(config, book_store.clone(), object_store, catalog_client);
        let app = make_app(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            book_store,
            media_path,
            catalog,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// True when no book record has been persisted
    pub fn book_store_is_empty(&self) -> bool {
        self.book_store
            .list_books()
            .expect("Failed to list books")
            .is_empty()
    }

    /// Number of files currently stored under the media root
    pub fn stored_file_count(&self) -> usize {
        fn count(dir: &std::path::Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|entry| {
                            let path = entry.path();
                            if path.is_dir() {
                                count(&path)
                            } else {
                                1
                            }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        count(&self.media_path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
