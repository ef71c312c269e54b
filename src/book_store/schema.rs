//! Database schema for the book library.

/// SQL schema for the books database. List-valued columns hold JSON arrays.
pub const BOOKS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    authors TEXT NOT NULL DEFAULT '[]',
    publisher TEXT,
    publish_date TEXT,
    isbn TEXT,
    page_count INTEGER,
    cover_url TEXT,
    thumbnail_url TEXT,
    cover_key TEXT,
    edition TEXT,
    description TEXT,
    category TEXT,
    categories TEXT NOT NULL DEFAULT '[]',
    rating_average REAL,
    rating_count INTEGER,

    -- Primary file
    format TEXT NOT NULL,
    storage_key TEXT NOT NULL,
    original_name TEXT NOT NULL,
    uploaded_by TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_books_created_at ON books(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_books_isbn ON books(isbn);
"#;
