use super::models::{Book, BookFormat};
use super::schema::BOOKS_SCHEMA_SQL;
use super::BookStore;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

const BOOK_COLUMNS: &str = "id, title, authors, publisher, publish_date, isbn, page_count, \
     cover_url, thumbnail_url, cover_key, edition, description, category, categories, \
     rating_average, rating_count, format, storage_key, original_name, uploaded_by, created_at";

/// SQLite implementation of BookStore.
pub struct SqliteBookStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBookStore {
    /// Open or create a books database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open books database: {:?}", path))?;
        conn.execute_batch(BOOKS_SCHEMA_SQL)
            .context("Failed to apply books schema")?;
        info!("Opened books database at {:?}", path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(BOOKS_SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Books database connection lock poisoned"))
    }

    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn to_json_list(values: &[String]) -> Result<String> {
        serde_json::to_string(values).context("Failed to serialize list column")
    }

    fn from_json_list(raw: Option<String>) -> Vec<String> {
        raw.and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    fn conversion_error(
        row: &rusqlite::Row,
        column: &str,
        err: Box<dyn std::error::Error + Send + Sync>,
    ) -> rusqlite::Error {
        match row.as_ref().column_index(column) {
            Ok(index) => {
                rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, err)
            }
            Err(e) => e,
        }
    }

    fn row_to_book(row: &rusqlite::Row) -> rusqlite::Result<Book> {
        let created_at_str: String = row.get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Self::conversion_error(row, "created_at", Box::new(e)))?;

        let format_str: String = row.get("format")?;
        let format = BookFormat::parse(&format_str).ok_or_else(|| {
            Self::conversion_error(
                row,
                "format",
                format!("Unknown book format '{}'", format_str).into(),
            )
        })?;

        Ok(Book {
            id: row.get("id")?,
            title: row.get("title")?,
            authors: Self::from_json_list(row.get("authors")?),
            publisher: row.get("publisher")?,
            publish_date: row.get("publish_date")?,
            isbn: row.get("isbn")?,
            page_count: row.get("page_count")?,
            cover_url: row.get("cover_url")?,
            thumbnail_url: row.get("thumbnail_url")?,
            cover_key: row.get("cover_key")?,
            edition: row.get("edition")?,
            description: row.get("description")?,
            category: row.get("category")?,
            categories: Self::from_json_list(row.get("categories")?),
            rating_average: row.get("rating_average")?,
            rating_count: row.get("rating_count")?,
            format,
            storage_key: row.get("storage_key")?,
            original_name: row.get("original_name")?,
            uploaded_by: row.get("uploaded_by")?,
            created_at,
        })
    }

    fn query_book(conn: &Connection, id: &str) -> Result<Option<Book>> {
        let book = conn
            .query_row(
                &format!("SELECT {} FROM books WHERE id = ?1", BOOK_COLUMNS),
                params![id],
                Self::row_to_book,
            )
            .optional()?;
        Ok(book)
    }
}

impl BookStore for SqliteBookStore {
    fn insert_book(&self, book: &Book) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO books ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
                BOOK_COLUMNS
            ),
            params![
                book.id,
                book.title,
                Self::to_json_list(&book.authors)?,
                book.publisher,
                book.publish_date,
                book.isbn,
                book.page_count,
                book.cover_url,
                book.thumbnail_url,
                book.cover_key,
                book.edition,
                book.description,
                book.category,
                Self::to_json_list(&book.categories)?,
                book.rating_average,
                book.rating_count,
                book.format.as_str(),
                book.storage_key,
                book.original_name,
                book.uploaded_by,
                Self::format_datetime(&book.created_at),
            ],
        )
        .with_context(|| format!("Failed to insert book {}", book.id))?;
        Ok(())
    }

    fn get_book(&self, id: &str) -> Result<Option<Book>> {
        let conn = self.conn()?;
        Self::query_book(&conn, id)
    }

    fn list_books(&self) -> Result<Vec<Book>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM books ORDER BY created_at DESC, rowid DESC",
            BOOK_COLUMNS
        ))?;
        let books = stmt
            .query_map([], Self::row_to_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    fn update_book_metadata(&self, book: &Book) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE books SET title = ?2, authors = ?3, publisher = ?4, publish_date = ?5, \
             isbn = ?6, page_count = ?7, cover_url = ?8, thumbnail_url = ?9, edition = ?10, \
             description = ?11, category = ?12, categories = ?13, rating_average = ?14, \
             rating_count = ?15 WHERE id = ?1",
            params![
                book.id,
                book.title,
                Self::to_json_list(&book.authors)?,
                book.publisher,
                book.publish_date,
                book.isbn,
                book.page_count,
                book.cover_url,
                book.thumbnail_url,
                book.edition,
                book.description,
                book.category,
                Self::to_json_list(&book.categories)?,
                book.rating_average,
                book.rating_count,
            ],
        )?;
        Ok(updated > 0)
    }

    fn delete_book(&self, id: &str) -> Result<Option<Book>> {
        let conn = self.conn()?;
        let Some(book) = Self::query_book(&conn, id)? else {
            return Ok(None);
        };
        conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
        Ok(Some(book))
    }
}
