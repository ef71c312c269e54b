mod models;
mod schema;
mod sqlite_book_store;

pub use models::{Book, BookFormat};
pub use sqlite_book_store::SqliteBookStore;

use anyhow::Result;

/// Trait for book record storage.
pub trait BookStore: Send + Sync {
    fn insert_book(&self, book: &Book) -> Result<()>;

    fn get_book(&self, id: &str) -> Result<Option<Book>>;

    /// All books, newest first.
    fn list_books(&self) -> Result<Vec<Book>>;

    /// Persists the descriptive metadata fields of `book`.
    /// Returns false when no book with that id exists.
    fn update_book_metadata(&self, book: &Book) -> Result<bool>;

    /// Deletes a book and returns the removed record, so callers can clean
    /// up its stored objects.
    fn delete_book(&self, id: &str) -> Result<Option<Book>>;
}
