//! Book lifecycle use-case service.
//!
//! # Responsibility
//! - Run every command as resolve identity -> existence guard -> lifecycle
//!   transition -> one storage write.
//! - Map resolver, lifecycle, guard and repository failures into one typed
//!   error surface.
//!
//! # Invariants
//! - The repository is injected; the service holds no global handle.
//! - Each command performs at most one existence lookup and one mutation.
//! - A rejected precondition never reaches a storage write.
//! - `update` is exempt from transition legality checks; `finish` is not.

use crate::catalog::{CatalogEntry, CatalogError, CatalogLookup};
use crate::guard::{self, GuardError};
use crate::identity::{attached_isbn, resolve_identity, IdentityError, IdentityInput};
use crate::isbn;
use crate::lifecycle::{
    add_transition, finish_transition, start_transition, LifecycleCommand, TransitionError,
};
use crate::model::book::{BookIdentity, BookRecord, ReadingState, StoredBook};
use crate::model::genres::normalize_genres;
use crate::repo::book_repo::{
    BookListQuery, BookPatch, BookRepository, DuplicateKey, RepoError,
};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub type ServiceResult<T> = Result<T, BookServiceError>;

/// Failure kinds surfaced to command callers.
#[derive(Debug)]
pub enum BookServiceError {
    InvalidIsbn(String),
    MissingIdentity {
        title_missing: bool,
        author_missing: bool,
    },
    ConflictingArguments {
        isbn: String,
        author: String,
    },
    IdentityConflict {
        positional: String,
        flag: String,
    },
    InvalidStateForTransition {
        command: LifecycleCommand,
        from: Option<ReadingState>,
        requested: ReadingState,
    },
    AlreadyExists(BookIdentity),
    NotFound(BookIdentity),
    /// Storage collaborator failure, propagated unchanged.
    Storage(RepoError),
    Catalog(CatalogError),
}

impl BookServiceError {
    /// Stable snake_case code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIsbn(_) => "invalid_isbn",
            Self::MissingIdentity { .. } => "missing_identity",
            Self::ConflictingArguments { .. } => "conflicting_arguments",
            Self::IdentityConflict { .. } => "identity_conflict",
            Self::InvalidStateForTransition { .. } => "invalid_state_for_transition",
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage_failure",
            Self::Catalog(_) => "catalog_failure",
        }
    }
}

impl Display for BookServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIsbn(value) => {
                write!(f, "{}", IdentityError::InvalidIsbn(value.clone()))
            }
            Self::MissingIdentity {
                title_missing,
                author_missing,
            } => write!(
                f,
                "{}",
                IdentityError::MissingIdentity {
                    title_missing: *title_missing,
                    author_missing: *author_missing,
                }
            ),
            Self::ConflictingArguments { isbn, author } => write!(
                f,
                "{}",
                IdentityError::ConflictingArguments {
                    isbn: isbn.clone(),
                    author: author.clone(),
                }
            ),
            Self::IdentityConflict { positional, flag } => write!(
                f,
                "{}",
                IdentityError::IdentityConflict {
                    positional: positional.clone(),
                    flag: flag.clone(),
                }
            ),
            Self::InvalidStateForTransition {
                command,
                from,
                requested,
            } => write!(
                f,
                "{}",
                TransitionError::InvalidStateForTransition {
                    command: *command,
                    from: *from,
                    requested: *requested,
                }
            ),
            Self::AlreadyExists(identity) => write!(f, "book already exists: {identity}"),
            Self::NotFound(identity) => write!(f, "book not found: {identity}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Catalog(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Catalog(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IdentityError> for BookServiceError {
    fn from(value: IdentityError) -> Self {
        match value {
            IdentityError::InvalidIsbn(value) => Self::InvalidIsbn(value),
            IdentityError::MissingIdentity {
                title_missing,
                author_missing,
            } => Self::MissingIdentity {
                title_missing,
                author_missing,
            },
            IdentityError::ConflictingArguments { isbn, author } => {
                Self::ConflictingArguments { isbn, author }
            }
            IdentityError::IdentityConflict { positional, flag } => {
                Self::IdentityConflict { positional, flag }
            }
        }
    }
}

impl From<TransitionError> for BookServiceError {
    fn from(value: TransitionError) -> Self {
        match value {
            TransitionError::InvalidStateForTransition {
                command,
                from,
                requested,
            } => Self::InvalidStateForTransition {
                command,
                from,
                requested,
            },
        }
    }
}

impl From<GuardError> for BookServiceError {
    fn from(value: GuardError) -> Self {
        match value {
            GuardError::AlreadyExists(identity) => Self::AlreadyExists(identity),
            GuardError::NotFound(identity) => Self::NotFound(identity),
            GuardError::Repo(err) => Self::Storage(err),
        }
    }
}

impl From<RepoError> for BookServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(identity) => Self::NotFound(identity),
            other => Self::Storage(other),
        }
    }
}

impl From<CatalogError> for BookServiceError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

/// Input for `start`.
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub identity: IdentityInput,
    pub series: Option<String>,
    /// Epoch seconds; defaults to now.
    pub started_at: Option<i64>,
    pub genres: Vec<String>,
    /// Catalog details filling title/author of an ISBN identity.
    pub catalog: Option<CatalogEntry>,
}

/// Input for `finish`.
#[derive(Debug, Clone, Default)]
pub struct FinishRequest {
    pub identity: IdentityInput,
    /// `Finished` when absent; only `Finished` or `Dnf` allowed.
    pub state: Option<ReadingState>,
    /// Epoch seconds; defaults to now.
    pub finished_at: Option<i64>,
}

/// Input for `add`.
#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    pub identity: IdentityInput,
    pub series: Option<String>,
    /// `None` state when absent.
    pub state: Option<ReadingState>,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub genres: Vec<String>,
    pub catalog: Option<CatalogEntry>,
}

/// Input for `update`. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub identity: IdentityInput,
    pub title: Option<String>,
    pub author: Option<String>,
    pub series: Option<String>,
    pub state: Option<ReadingState>,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub genres: Option<Vec<String>>,
}

/// Book lifecycle service over an injected repository.
pub struct BookService<R: BookRepository> {
    repo: R,
    clock: fn() -> i64,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository and the system clock.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            clock: now_epoch_secs,
        }
    }

    /// Replaces the clock used for default timestamps.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Borrows the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Starts reading a book that is not tracked yet.
    ///
    /// # Errors
    /// - Identity errors from resolution.
    /// - `AlreadyExists` when the identity is stored; nothing is written.
    pub fn start(&self, request: &StartRequest) -> ServiceResult<StoredBook> {
        log_outcome("book_start", self.start_inner(request))
    }

    fn start_inner(&self, request: &StartRequest) -> ServiceResult<StoredBook> {
        let identity = resolve_identity(&request.identity)?;
        let extra_isbn = attached_isbn(&request.identity)?;
        guard::require_absent(&self.repo, &identity)?;

        let transition = start_transition(request.started_at, (self.clock)());
        let mut book = new_record(
            &identity,
            extra_isbn,
            request.catalog.as_ref(),
            request.series.as_deref(),
            &request.genres,
        );
        book.state = transition.state;
        book.started_at = transition.started_at;

        self.insert(&identity, book)
    }

    /// Finishes (or abandons) a tracked book.
    ///
    /// # Errors
    /// - Identity errors from resolution.
    /// - `NotFound` when the identity is not stored.
    /// - `InvalidStateForTransition` for targets other than `Finished`/`Dnf`
    ///   or when the book is already finished or abandoned.
    pub fn finish(&self, request: &FinishRequest) -> ServiceResult<StoredBook> {
        log_outcome("book_finish", self.finish_inner(request))
    }

    fn finish_inner(&self, request: &FinishRequest) -> ServiceResult<StoredBook> {
        let identity = resolve_identity(&request.identity)?;
        let mut stored = guard::require_present(&self.repo, &identity)?;

        let transition = finish_transition(
            stored.book.state,
            request.state,
            request.finished_at,
            (self.clock)(),
        )?;
        let patch = BookPatch {
            state: Some(transition.state),
            finished_at: transition.finished_at,
            ..BookPatch::default()
        };

        self.write_patch(&identity, &patch, &mut stored)?;
        Ok(stored)
    }

    /// Registers a full record in one call, for backfilling history.
    ///
    /// # Errors
    /// - Identity errors from resolution.
    /// - `AlreadyExists` when the identity is stored; nothing is written.
    pub fn add(&self, request: &AddRequest) -> ServiceResult<StoredBook> {
        log_outcome("book_add", self.add_inner(request))
    }

    fn add_inner(&self, request: &AddRequest) -> ServiceResult<StoredBook> {
        let identity = resolve_identity(&request.identity)?;
        let extra_isbn = attached_isbn(&request.identity)?;
        guard::require_absent(&self.repo, &identity)?;

        let transition = add_transition(request.state, request.started_at, request.finished_at);
        let mut book = new_record(
            &identity,
            extra_isbn,
            request.catalog.as_ref(),
            request.series.as_deref(),
            &request.genres,
        );
        book.state = transition.state;
        book.started_at = transition.started_at;
        book.finished_at = transition.finished_at;

        self.insert(&identity, book)
    }

    /// Mutates any subset of fields on a tracked book.
    ///
    /// A supplied state is written as-is, without checking that it is a
    /// legal successor of the stored one.
    ///
    /// # Errors
    /// - Identity errors from resolution; an empty new title or author is
    ///   reported as `MissingIdentity`.
    /// - `NotFound` when the identity is not stored.
    pub fn update(&self, request: &UpdateRequest) -> ServiceResult<StoredBook> {
        log_outcome("book_update", self.update_inner(request))
    }

    fn update_inner(&self, request: &UpdateRequest) -> ServiceResult<StoredBook> {
        let identity = resolve_identity(&request.identity)?;
        let new_isbn = attached_isbn(&request.identity)?;
        let title = normalize_rename(request.title.as_deref(), true)?;
        let author = normalize_rename(request.author.as_deref(), false)?;
        let mut stored = guard::require_present(&self.repo, &identity)?;

        let patch = BookPatch {
            isbn: new_isbn,
            title,
            author,
            series: request.series.clone(),
            state: request.state,
            started_at: request.started_at,
            finished_at: request.finished_at,
            genres: request.genres.as_deref().map(normalize_genres),
        };
        if patch.is_empty() {
            return Ok(stored);
        }

        self.write_patch(&identity, &patch, &mut stored)?;
        Ok(stored)
    }

    /// Removes a tracked book and returns the removed row.
    ///
    /// # Errors
    /// - Identity errors from resolution.
    /// - `NotFound` when the identity is not stored.
    pub fn remove(&self, identity: &IdentityInput) -> ServiceResult<StoredBook> {
        log_outcome("book_remove", self.remove_inner(identity))
    }

    fn remove_inner(&self, input: &IdentityInput) -> ServiceResult<StoredBook> {
        let identity = resolve_identity(input)?;
        let stored = guard::require_present(&self.repo, &identity)?;
        self.repo.remove_book(&identity)?;
        Ok(stored)
    }

    /// Looks one book up without mutating anything.
    pub fn find(&self, input: &IdentityInput) -> ServiceResult<Option<StoredBook>> {
        let identity = resolve_identity(input)?;
        Ok(guard::lookup(&self.repo, &identity)?)
    }

    /// Lists tracked books.
    pub fn list(&self, query: &BookListQuery) -> ServiceResult<Vec<StoredBook>> {
        Ok(self.repo.list_books(query)?)
    }

    fn insert(&self, identity: &BookIdentity, book: BookRecord) -> ServiceResult<StoredBook> {
        let id = self
            .repo
            .insert_book(&book)
            .map_err(|err| map_write_error(err, identity, &book))?;
        Ok(StoredBook { id, book })
    }

    /// Writes `patch` and applies it to `stored` once the write succeeded.
    fn write_patch(
        &self,
        identity: &BookIdentity,
        patch: &BookPatch,
        stored: &mut StoredBook,
    ) -> ServiceResult<()> {
        let mut updated = stored.book.clone();
        patch.apply_to(&mut updated);
        self.repo
            .update_book(identity, patch)
            .map_err(|err| map_write_error(err, identity, &updated))?;
        stored.book = updated;
        Ok(())
    }
}

/// Validates raw ISBN text and looks it up in the catalog.
///
/// # Errors
/// - `InvalidIsbn` before any request is made.
/// - `Catalog` for transport, status, decode or not-found failures.
pub fn search_catalog<C: CatalogLookup + ?Sized>(
    catalog: &C,
    raw_isbn: &str,
) -> ServiceResult<CatalogEntry> {
    if !isbn::validate(raw_isbn) {
        return Err(BookServiceError::InvalidIsbn(raw_isbn.to_string()));
    }
    log_outcome(
        "book_search",
        catalog
            .lookup_isbn(&isbn::clean(raw_isbn))
            .map_err(BookServiceError::from),
    )
}

/// Current Unix time in seconds; 0 if the clock is before the epoch.
pub fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn new_record(
    identity: &BookIdentity,
    extra_isbn: Option<String>,
    catalog: Option<&CatalogEntry>,
    series: Option<&str>,
    genres: &[String],
) -> BookRecord {
    let mut book = BookRecord::for_identity(identity);
    if extra_isbn.is_some() {
        book.isbn = extra_isbn;
    }
    if let (BookIdentity::Isbn { .. }, Some(entry)) = (identity, catalog) {
        book.title = entry.title.trim().to_lowercase();
        book.author = entry.author_line().trim().to_lowercase();
    }
    book.series = series
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    book.genres = normalize_genres(genres);
    book
}

fn normalize_rename(value: Option<&str>, is_title: bool) -> ServiceResult<Option<String>> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Err(BookServiceError::MissingIdentity {
            title_missing: is_title,
            author_missing: !is_title,
        }),
        Some(value) => Ok(Some(value.to_lowercase())),
    }
}

/// Maps a unique-index rejection to `AlreadyExists` naming the key that
/// collided, which is not always the identity the command was keyed by.
fn map_write_error(
    err: RepoError,
    identity: &BookIdentity,
    written: &BookRecord,
) -> BookServiceError {
    let key = match err {
        RepoError::Duplicate { key, .. } => key,
        other => return other.into(),
    };
    let existing = match (key, written.isbn.as_ref()) {
        (DuplicateKey::Isbn, Some(isbn)) => BookIdentity::Isbn {
            value: isbn.clone(),
        },
        (DuplicateKey::TitleAuthor, _)
            if !written.title.is_empty() && !written.author.is_empty() =>
        {
            BookIdentity::TitleAuthor {
                title: written.title.clone(),
                author: written.author.clone(),
            }
        }
        _ => identity.clone(),
    };
    BookServiceError::AlreadyExists(existing)
}

fn log_outcome<T>(event: &str, result: ServiceResult<T>) -> ServiceResult<T> {
    match &result {
        Ok(_) => info!("event={event} module=service status=ok"),
        Err(err) => error!(
            "event={event} module=service status=error error_code={}",
            err.code()
        ),
    }
    result
}
