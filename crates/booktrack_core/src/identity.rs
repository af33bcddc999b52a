//! Book identity resolution from command inputs.
//!
//! # Responsibility
//! - Turn already-parsed command values into one canonical `BookIdentity`.
//! - Reject missing, contradictory or checksum-invalid identity input.
//!
//! # Invariants
//! - Resolution is pure: no storage or catalog access.
//! - In ISBN mode the positional `title` argument carries the ISBN literal.
//! - Title/author identities are lower-cased so lookups are case-insensitive.

use crate::isbn;
use crate::model::book::BookIdentity;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw identity-related values of one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityInput {
    /// Global ISBN-mode switch (`-I/--ISBN`).
    pub isbn_mode: bool,
    /// First positional argument; the ISBN literal in ISBN mode.
    pub title: String,
    /// Second positional argument.
    pub author: String,
    /// `--isbn` flag value; `Some` means the flag was set.
    pub isbn_flag: Option<String>,
}

impl IdentityInput {
    /// Title/author mode input.
    pub fn title_author(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    /// ISBN mode input with the ISBN in the positional slot.
    pub fn isbn(isbn: impl Into<String>) -> Self {
        Self {
            isbn_mode: true,
            title: isbn.into(),
            ..Self::default()
        }
    }

    /// Sets the `--isbn` flag value.
    pub fn with_isbn_flag(mut self, isbn: impl Into<String>) -> Self {
        self.isbn_flag = Some(isbn.into());
        self
    }
}

/// Identity resolution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// ISBN text fails checksum validation.
    InvalidIsbn(String),
    /// Title and/or author absent outside ISBN mode.
    MissingIdentity {
        title_missing: bool,
        author_missing: bool,
    },
    /// ISBN mode identity combined with an author argument.
    ConflictingArguments { isbn: String, author: String },
    /// Positional ISBN and `--isbn` flag disagree after cleaning.
    IdentityConflict { positional: String, flag: String },
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIsbn(value) => write!(f, "'{value}' is not a valid ISBN number"),
            Self::MissingIdentity {
                title_missing: true,
                author_missing: true,
            } => write!(f, "title and author must be provided or use '-I ISBN'"),
            Self::MissingIdentity {
                title_missing: true,
                ..
            } => write!(f, "title must be provided or use '-I ISBN'"),
            Self::MissingIdentity { .. } => write!(f, "author must be provided or use '-I ISBN'"),
            Self::ConflictingArguments { isbn, author } => write!(
                f,
                "ISBN mode takes a single ISBN argument; got ISBN '{isbn}' and author '{author}'"
            ),
            Self::IdentityConflict { positional, flag } => write!(
                f,
                "isbn was set twice and they do not match: ISBN = '{positional}' isbn = '{flag}'"
            ),
        }
    }
}

impl Error for IdentityError {}

/// Resolves command input into a canonical identity.
///
/// # Errors
/// - `MissingIdentity` when title or author is empty outside ISBN mode.
/// - `InvalidIsbn` when the ISBN-mode literal fails validation; checked
///   before any `--isbn` flag comparison.
/// - `ConflictingArguments` when an author is given in ISBN mode.
/// - `IdentityConflict` when the ISBN-mode literal and `--isbn` differ.
pub fn resolve_identity(input: &IdentityInput) -> Result<BookIdentity, IdentityError> {
    if !input.isbn_mode {
        let title = input.title.trim();
        let author = input.author.trim();
        if title.is_empty() || author.is_empty() {
            return Err(IdentityError::MissingIdentity {
                title_missing: title.is_empty(),
                author_missing: author.is_empty(),
            });
        }
        return Ok(BookIdentity::TitleAuthor {
            title: title.to_lowercase(),
            author: author.to_lowercase(),
        });
    }

    let positional = input.title.as_str();
    if !isbn::validate(positional) {
        return Err(IdentityError::InvalidIsbn(positional.to_string()));
    }
    if !input.author.trim().is_empty() {
        return Err(IdentityError::ConflictingArguments {
            isbn: positional.to_string(),
            author: input.author.clone(),
        });
    }

    let cleaned = isbn::canonical(positional);
    if let Some(flag) = input.isbn_flag.as_deref() {
        if isbn::canonical(flag) != cleaned {
            return Err(IdentityError::IdentityConflict {
                positional: positional.to_string(),
                flag: flag.to_string(),
            });
        }
    }

    Ok(BookIdentity::Isbn { value: cleaned })
}

/// Returns the ISBN to store on the record alongside a title/author identity.
///
/// In ISBN mode the identity already carries the ISBN, so this returns
/// `Ok(None)`; outside it a set `--isbn` flag must validate.
pub fn attached_isbn(input: &IdentityInput) -> Result<Option<String>, IdentityError> {
    if input.isbn_mode {
        return Ok(None);
    }
    match input.isbn_flag.as_deref() {
        None => Ok(None),
        Some(flag) if isbn::validate(flag) => Ok(Some(isbn::canonical(flag))),
        Some(flag) => Err(IdentityError::InvalidIsbn(flag.to_string())),
    }
}
