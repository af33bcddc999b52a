//! Third-party catalog lookup by ISBN.
//!
//! # Responsibility
//! - Define the lookup contract used to fill title/author from an ISBN.
//! - Provide the Open Library implementation.
//!
//! # Invariants
//! - Callers pass an already-validated, cleaned ISBN.
//! - Identity resolution never calls the catalog.
//! - One request per lookup; no retries or backoff.

pub mod open_library;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Title and authors reported by a catalog for one ISBN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub authors: Vec<String>,
}

impl CatalogEntry {
    /// Authors joined for storage in the single `author` column.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Http(reqwest::Error),
    /// Non-success HTTP status with a truncated body.
    Status { status: u16, body: String },
    Decode(serde_json::Error),
    /// Catalog returned no document for the ISBN.
    NotFound(String),
}

impl CatalogError {
    /// Stable snake_case code for log events; never carries the ISBN.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "catalog_http",
            Self::Status { .. } => "catalog_status",
            Self::Decode(_) => "catalog_decode",
            Self::NotFound(_) => "catalog_not_found",
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "catalog request failed: {err}"),
            Self::Status { status, body } => {
                write!(f, "catalog returned status {status}: {body}")
            }
            Self::Decode(err) => write!(f, "catalog response could not be decoded: {err}"),
            Self::NotFound(isbn) => write!(f, "no catalog entry found for '{isbn}'"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Status { .. } | Self::NotFound(_) => None,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

/// Catalog collaborator contract.
pub trait CatalogLookup {
    fn lookup_isbn(&self, isbn: &str) -> CatalogResult<CatalogEntry>;
}
