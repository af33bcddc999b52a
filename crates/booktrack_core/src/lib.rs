//! Core domain logic for booktrack, a personal reading tracker.
//! This crate is the single source of truth for book identity and
//! reading-lifecycle invariants.

pub mod catalog;
pub mod db;
pub mod guard;
pub mod identity;
pub mod isbn;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use catalog::open_library::OpenLibraryClient;
pub use catalog::{CatalogEntry, CatalogError, CatalogLookup};
pub use identity::{resolve_identity, IdentityError, IdentityInput};
pub use lifecycle::{LifecycleCommand, TransitionError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::book::{title_case, BookId, BookIdentity, BookRecord, ReadingState, StoredBook};
pub use repo::book_repo::{
    BookListQuery, BookPatch, BookRepository, DuplicateKey, RepoError, RepoResult,
    SqliteBookRepository,
};
pub use service::book_service::{
    search_catalog, AddRequest, BookService, BookServiceError, FinishRequest, ServiceResult,
    StartRequest, UpdateRequest,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
