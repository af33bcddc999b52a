//! Existence preconditions checked before a mutation.
//!
//! # Responsibility
//! - Look a resolved identity up in storage exactly once.
//! - Enforce "must be absent" for creation and "must be present" for
//!   mutation and removal.
//!
//! # Invariants
//! - ISBN identities match `books.isbn` exactly.
//! - Title/author identities match lower-cased `title` AND `author`.
//! - Check-then-act is not atomic here; unique indexes back inserts.

use crate::model::book::{BookIdentity, StoredBook};
use crate::repo::book_repo::{BookRepository, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Precondition failure or storage error raised by the guard.
#[derive(Debug)]
pub enum GuardError {
    AlreadyExists(BookIdentity),
    NotFound(BookIdentity),
    Repo(RepoError),
}

impl Display for GuardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(identity) => write!(f, "book already exists: {identity}"),
            Self::NotFound(identity) => write!(f, "book not found: {identity}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GuardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GuardError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Looks up the stored row for `identity`.
pub fn lookup<R: BookRepository + ?Sized>(
    repo: &R,
    identity: &BookIdentity,
) -> Result<Option<StoredBook>, RepoError> {
    match identity {
        BookIdentity::Isbn { value } => repo.find_by_isbn(value),
        BookIdentity::TitleAuthor { title, author } => repo.find_by_title_author(title, author),
    }
}

/// Returns whether a record for `identity` exists.
pub fn exists<R: BookRepository + ?Sized>(
    repo: &R,
    identity: &BookIdentity,
) -> Result<bool, RepoError> {
    Ok(lookup(repo, identity)?.is_some())
}

/// Fails with `AlreadyExists` when `identity` is stored.
pub fn require_absent<R: BookRepository + ?Sized>(
    repo: &R,
    identity: &BookIdentity,
) -> Result<(), GuardError> {
    if exists(repo, identity)? {
        return Err(GuardError::AlreadyExists(identity.clone()));
    }
    Ok(())
}

/// Fails with `NotFound` when `identity` is not stored; returns the row.
pub fn require_present<R: BookRepository + ?Sized>(
    repo: &R,
    identity: &BookIdentity,
) -> Result<StoredBook, GuardError> {
    lookup(repo, identity)?.ok_or_else(|| GuardError::NotFound(identity.clone()))
}
