//! Bookshelf server library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod auth;
pub mod book_store;
pub mod config;
pub mod epub;
pub mod metadata;
pub mod object_store;
pub mod server;
pub mod upload;

// Re-export commonly used types for convenience
pub use book_store::{Book, BookFormat, BookStore, SqliteBookStore};
pub use metadata::{BookMetadata, GoogleBooksClient, MetadataProvider};
pub use object_store::{FsObjectStore, ObjectStore};
pub use server::{run_server, RequestsLoggingLevel};
pub use upload::{UploadOrchestrator, UploadOutcome, UploadRequest};
