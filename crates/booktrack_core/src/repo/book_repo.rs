//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup, insert, partial update, removal and listing over the
//!   `books` table.
//! - Keep SQL and column encodings inside the persistence boundary.
//!
//! # Invariants
//! - Identity lookups are exact matches: `isbn`, or lower-cased `title` AND
//!   `author`.
//! - Unique-index violations surface as `RepoError::Duplicate`, never as a
//!   raw SQLite error.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::book::{BookId, BookIdentity, BookRecord, ReadingState, StoredBook};
use crate::model::genres::{decode_genres, encode_genres};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    isbn,
    author,
    title,
    series,
    date_started,
    date_finished,
    status,
    genres
FROM books";

const REQUIRED_BOOK_COLUMNS: &[&str] = &[
    "id",
    "isbn",
    "author",
    "title",
    "series",
    "date_started",
    "date_finished",
    "status",
    "genres",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Unique identity index a write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    /// `idx_books_isbn_unique`
    Isbn,
    /// `idx_books_title_author_unique`
    TitleAuthor,
}

/// Repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(BookIdentity),
    /// Write rejected by a unique identity index.
    Duplicate { key: DuplicateKey, message: String },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(identity) => write!(f, "book not found: {identity}"),
            Self::Duplicate { message, .. } => write!(f, "book already stored: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Partial field set for `update_book`. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    /// Cleaned ISBN.
    pub isbn: Option<String>,
    /// Lower-cased title.
    pub title: Option<String>,
    /// Lower-cased author.
    pub author: Option<String>,
    /// Empty string clears the series.
    pub series: Option<String>,
    pub state: Option<ReadingState>,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub genres: Option<Vec<String>>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the patch to an in-memory record.
    pub fn apply_to(&self, book: &mut BookRecord) {
        if let Some(isbn) = &self.isbn {
            book.isbn = Some(isbn.clone());
        }
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(series) = &self.series {
            book.series = non_empty(series);
        }
        if let Some(state) = self.state {
            book.state = state;
        }
        if let Some(started_at) = self.started_at {
            book.started_at = Some(started_at);
        }
        if let Some(finished_at) = self.finished_at {
            book.finished_at = Some(finished_at);
        }
        if let Some(genres) = &self.genres {
            book.genres = decode_genres(&encode_genres(genres));
        }
    }
}

/// Query options for listing books.
#[derive(Debug, Clone, Default)]
pub struct BookListQuery {
    pub state: Option<ReadingState>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Storage collaborator for book records.
pub trait BookRepository {
    fn find_by_isbn(&self, isbn: &str) -> RepoResult<Option<StoredBook>>;
    fn find_by_title_author(&self, title: &str, author: &str) -> RepoResult<Option<StoredBook>>;
    fn insert_book(&self, book: &BookRecord) -> RepoResult<BookId>;
    fn update_book(&self, identity: &BookIdentity, patch: &BookPatch) -> RepoResult<()>;
    fn remove_book(&self, identity: &BookIdentity) -> RepoResult<()>;
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<StoredBook>>;
}

impl<R: BookRepository + ?Sized> BookRepository for &R {
    fn find_by_isbn(&self, isbn: &str) -> RepoResult<Option<StoredBook>> {
        (**self).find_by_isbn(isbn)
    }

    fn find_by_title_author(&self, title: &str, author: &str) -> RepoResult<Option<StoredBook>> {
        (**self).find_by_title_author(title, author)
    }

    fn insert_book(&self, book: &BookRecord) -> RepoResult<BookId> {
        (**self).insert_book(book)
    }

    fn update_book(&self, identity: &BookIdentity, patch: &BookPatch) -> RepoResult<()> {
        (**self).update_book(identity, patch)
    }

    fn remove_book(&self, identity: &BookIdentity) -> RepoResult<()> {
        (**self).remove_book(identity)
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<StoredBook>> {
        (**self).list_books(query)
    }
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a connection returned by `open_db`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema does
    ///   not match this binary.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn find_one(&self, filter: &str, bind_values: Vec<Value>) -> RepoResult<Option<StoredBook>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE {filter} LIMIT 1;"))?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }
        Ok(None)
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn find_by_isbn(&self, isbn: &str) -> RepoResult<Option<StoredBook>> {
        self.find_one("isbn = ?1", vec![Value::Text(isbn.to_string())])
    }

    fn find_by_title_author(&self, title: &str, author: &str) -> RepoResult<Option<StoredBook>> {
        self.find_one(
            "title = ?1 AND author = ?2",
            vec![
                Value::Text(title.to_lowercase()),
                Value::Text(author.to_lowercase()),
            ],
        )
    }

    fn insert_book(&self, book: &BookRecord) -> RepoResult<BookId> {
        self.conn
            .execute(
                "INSERT INTO books (
                    isbn,
                    author,
                    title,
                    series,
                    date_started,
                    date_finished,
                    status,
                    genres
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    book.isbn.as_deref(),
                    book.author.to_lowercase(),
                    book.title.to_lowercase(),
                    book.series.as_deref().and_then(non_empty),
                    book.started_at,
                    book.finished_at,
                    book.state.to_db(),
                    encode_genres(&book.genres),
                ],
            )
            .map_err(map_write_error)?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_book(&self, identity: &BookIdentity, patch: &BookPatch) -> RepoResult<()> {
        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(isbn) = &patch.isbn {
            assignments.push("isbn = ?");
            bind_values.push(Value::Text(isbn.clone()));
        }
        if let Some(title) = &patch.title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.to_lowercase()));
        }
        if let Some(author) = &patch.author {
            assignments.push("author = ?");
            bind_values.push(Value::Text(author.to_lowercase()));
        }
        if let Some(series) = &patch.series {
            assignments.push("series = ?");
            bind_values.push(non_empty(series).map_or(Value::Null, Value::Text));
        }
        if let Some(state) = patch.state {
            assignments.push("status = ?");
            bind_values.push(Value::Integer(state.to_db()));
        }
        if let Some(started_at) = patch.started_at {
            assignments.push("date_started = ?");
            bind_values.push(Value::Integer(started_at));
        }
        if let Some(finished_at) = patch.finished_at {
            assignments.push("date_finished = ?");
            bind_values.push(Value::Integer(finished_at));
        }
        if let Some(genres) = &patch.genres {
            assignments.push("genres = ?");
            bind_values.push(Value::Text(encode_genres(genres)));
        }

        if assignments.is_empty() {
            return match self.find_book(identity)? {
                Some(_) => Ok(()),
                None => Err(RepoError::NotFound(identity.clone())),
            };
        }

        let (filter, filter_values) = identity_filter(identity);
        bind_values.extend(filter_values);
        let sql = format!(
            "UPDATE books SET {} WHERE {filter};",
            assignments.join(", ")
        );
        let changed = self
            .conn
            .execute(&sql, params_from_iter(bind_values))
            .map_err(map_write_error)?;

        if changed == 0 {
            return Err(RepoError::NotFound(identity.clone()));
        }
        Ok(())
    }

    fn remove_book(&self, identity: &BookIdentity) -> RepoResult<()> {
        let (filter, bind_values) = identity_filter(identity);
        let changed = self.conn.execute(
            &format!("DELETE FROM books WHERE {filter};"),
            params_from_iter(bind_values),
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(identity.clone()));
        }
        Ok(())
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<StoredBook>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(state) = query.state {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Integer(state.to_db()));
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }
}

impl SqliteBookRepository<'_> {
    fn find_book(&self, identity: &BookIdentity) -> RepoResult<Option<StoredBook>> {
        match identity {
            BookIdentity::Isbn { value } => self.find_by_isbn(value),
            BookIdentity::TitleAuthor { title, author } => self.find_by_title_author(title, author),
        }
    }
}

fn identity_filter(identity: &BookIdentity) -> (&'static str, Vec<Value>) {
    match identity {
        BookIdentity::Isbn { value } => ("isbn = ?", vec![Value::Text(value.clone())]),
        BookIdentity::TitleAuthor { title, author } => (
            "title = ? AND author = ?",
            vec![
                Value::Text(title.to_lowercase()),
                Value::Text(author.to_lowercase()),
            ],
        ),
    }
}

fn map_write_error(err: rusqlite::Error) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            let message = message.clone().unwrap_or_else(|| failure.to_string());
            RepoError::Duplicate {
                key: duplicate_key(&message),
                message,
            }
        }
        _ => err.into(),
    }
}

/// SQLite names plain-column unique indexes by their columns
/// (`books.isbn`) and expression indexes by name.
fn duplicate_key(message: &str) -> DuplicateKey {
    if message.contains("books.isbn") || message.contains("idx_books_isbn_unique") {
        DuplicateKey::Isbn
    } else {
        DuplicateKey::TitleAuthor
    }
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<StoredBook> {
    let status: i64 = row.get("status")?;
    let state = ReadingState::from_db(status).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status value `{status}` in books.status"))
    })?;

    let genres: Option<String> = row.get("genres")?;

    Ok(StoredBook {
        id: row.get("id")?,
        book: BookRecord {
            isbn: row.get("isbn")?,
            author: row.get("author")?,
            title: row.get("title")?,
            series: row.get("series")?,
            state,
            started_at: row.get("date_started")?,
            finished_at: row.get("date_finished")?,
            genres: genres.as_deref().map(decode_genres).unwrap_or_default(),
        },
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'books'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable("books"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(books);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_BOOK_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "books",
                column,
            });
        }
    }

    Ok(())
}
