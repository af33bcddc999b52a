//! Book domain model.
//!
//! # Responsibility
//! - Define the identity used to look books up and the persisted record.
//! - Define the reading lifecycle states and their storage encoding.
//!
//! # Invariants
//! - `BookIdentity::Isbn` holds a cleaned, checksum-valid ISBN.
//! - `BookIdentity::TitleAuthor` never holds an empty title or author, and
//!   both are lower-cased.
//! - Persisted state ordinals are frozen: `NONE=0, READING=1, FINISHED=2,
//!   TBR=3, DNF=4`. Column `books.status` defaults to `0`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Surrogate row id assigned by storage.
pub type BookId = i64;

/// Key used to look up and distinguish one book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookIdentity {
    /// Cleaned ISBN-10 or ISBN-13 text.
    Isbn { value: String },
    /// Lower-cased title and author pair.
    TitleAuthor { title: String, author: String },
}

impl BookIdentity {
    /// Returns the ISBN value for ISBN identities.
    pub fn isbn(&self) -> Option<&str> {
        match self {
            Self::Isbn { value } => Some(value.as_str()),
            Self::TitleAuthor { .. } => None,
        }
    }
}

impl Display for BookIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Isbn { value } => write!(f, "isbn `{value}`"),
            Self::TitleAuthor { title, author } => write!(f, "`{title}` by `{author}`"),
        }
    }
}

/// Reading lifecycle state of one book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingState {
    /// No explicit status yet.
    #[default]
    None,
    /// Queued to be read.
    Tbr,
    /// Currently being read.
    Reading,
    /// Read to the end.
    Finished,
    /// Abandoned ("did not finish").
    Dnf,
}

/// All states, in persisted-ordinal order.
pub const READING_STATES: [ReadingState; 5] = [
    ReadingState::None,
    ReadingState::Reading,
    ReadingState::Finished,
    ReadingState::Tbr,
    ReadingState::Dnf,
];

impl ReadingState {
    /// Stable lower-case name used by the command surface.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Tbr => "tbr",
            Self::Reading => "reading",
            Self::Finished => "finished",
            Self::Dnf => "dnf",
        }
    }

    /// Persisted integer for `books.status`.
    pub fn to_db(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Reading => 1,
            Self::Finished => 2,
            Self::Tbr => 3,
            Self::Dnf => 4,
        }
    }

    /// Decodes a persisted `books.status` integer.
    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Reading),
            2 => Some(Self::Finished),
            3 => Some(Self::Tbr),
            4 => Some(Self::Dnf),
            _ => None,
        }
    }

    /// `Finished` and `Dnf` close the reading lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Dnf)
    }
}

impl Display for ReadingState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Error for unknown state names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingStateParseError(pub String);

impl Display for ReadingStateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' is not a valid state for a book, state must be one of 'none' 'reading' 'finished' 'tbr' 'dnf'",
            self.0
        )
    }
}

impl Error for ReadingStateParseError {}

impl FromStr for ReadingState {
    type Err = ReadingStateParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "tbr" => Ok(Self::Tbr),
            "reading" => Ok(Self::Reading),
            "finished" => Ok(Self::Finished),
            "dnf" => Ok(Self::Dnf),
            _ => Err(ReadingStateParseError(value.to_string())),
        }
    }
}

/// Persisted book entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Cleaned ISBN when known.
    pub isbn: Option<String>,
    /// Lower-cased author; empty for ISBN-only records.
    pub author: String,
    /// Lower-cased title; empty for ISBN-only records.
    pub title: String,
    pub series: Option<String>,
    pub state: ReadingState,
    /// Unix epoch seconds.
    pub started_at: Option<i64>,
    /// Unix epoch seconds.
    pub finished_at: Option<i64>,
    /// Insertion-ordered genre names.
    pub genres: Vec<String>,
}

impl BookRecord {
    /// Builds an empty record keyed by `identity`.
    ///
    /// ISBN identities leave title/author empty; title/author identities
    /// leave `isbn` unset.
    pub fn for_identity(identity: &BookIdentity) -> Self {
        match identity {
            BookIdentity::Isbn { value } => Self {
                isbn: Some(value.clone()),
                ..Self::default()
            },
            BookIdentity::TitleAuthor { title, author } => Self {
                title: title.clone(),
                author: author.clone(),
                ..Self::default()
            },
        }
    }

    /// Seconds spent between start and finish.
    ///
    /// `None` unless both timestamps exist and finish is not before start.
    pub fn took(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) if finished >= started => Some(finished - started),
            _ => None,
        }
    }
}

/// Stored row: surrogate id plus record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBook {
    pub id: BookId,
    #[serde(flatten)]
    pub book: BookRecord,
}

/// Upper-cases the first letter of every word.
///
/// Stored titles and authors are lower-cased; this restores a readable form
/// for display only.
pub fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if at_word_start {
            output.extend(ch.to_uppercase());
        } else {
            output.push(ch);
        }
        at_word_start = ch.is_whitespace() || matches!(ch, '-' | '(' | '"' | '/');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{title_case, BookIdentity, BookRecord, ReadingState, StoredBook, READING_STATES};

    #[test]
    fn state_db_mapping_is_frozen() {
        let encoded: Vec<i64> = READING_STATES.iter().map(|s| s.to_db()).collect();
        assert_eq!(encoded, vec![0, 1, 2, 3, 4]);
        for state in READING_STATES {
            assert_eq!(ReadingState::from_db(state.to_db()), Some(state));
        }
        assert_eq!(ReadingState::from_db(5), None);
        assert_eq!(ReadingState::default(), ReadingState::None);
    }

    #[test]
    fn state_parses_case_insensitively() {
        assert_eq!("DNF".parse::<ReadingState>().unwrap(), ReadingState::Dnf);
        assert_eq!(" Tbr ".parse::<ReadingState>().unwrap(), ReadingState::Tbr);
        let err = "paused".parse::<ReadingState>().unwrap_err();
        assert!(err.to_string().contains("'paused' is not a valid state"));
    }

    #[test]
    fn only_finished_and_dnf_are_terminal() {
        let terminal: Vec<_> = READING_STATES
            .into_iter()
            .filter(|state| state.is_terminal())
            .collect();
        assert_eq!(terminal, vec![ReadingState::Finished, ReadingState::Dnf]);
    }

    #[test]
    fn took_requires_ordered_timestamps() {
        let mut record = BookRecord {
            started_at: Some(100),
            finished_at: Some(400),
            ..BookRecord::default()
        };
        assert_eq!(record.took(), Some(300));
        record.finished_at = Some(50);
        assert_eq!(record.took(), None);
        record.finished_at = None;
        assert_eq!(record.took(), None);
    }

    #[test]
    fn record_for_identity_fills_key_fields() {
        let by_isbn = BookRecord::for_identity(&BookIdentity::Isbn {
            value: "9780306406157".to_string(),
        });
        assert_eq!(by_isbn.isbn.as_deref(), Some("9780306406157"));
        assert!(by_isbn.title.is_empty());

        let by_pair = BookRecord::for_identity(&BookIdentity::TitleAuthor {
            title: "dune".to_string(),
            author: "frank herbert".to_string(),
        });
        assert_eq!(by_pair.isbn, None);
        assert_eq!(by_pair.title, "dune");
    }

    #[test]
    fn title_case_capitalizes_words() {
        assert_eq!(title_case("the hobbit"), "The Hobbit");
        assert_eq!(title_case("j. r. r. tolkien"), "J. R. R. Tolkien");
        assert_eq!(title_case("ender's game"), "Ender's Game");
    }

    #[test]
    fn stored_book_serializes_flat_with_snake_case_state() {
        let stored = StoredBook {
            id: 3,
            book: BookRecord {
                title: "dune".to_string(),
                author: "frank herbert".to_string(),
                state: ReadingState::Dnf,
                genres: vec!["sci-fi".to_string()],
                ..BookRecord::default()
            },
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["title"], "dune");
        assert_eq!(value["state"], "dnf");
        assert_eq!(value["isbn"], serde_json::Value::Null);
        assert_eq!(value["genres"], serde_json::json!(["sci-fi"]));
    }

    #[test]
    fn identity_serializes_with_kind_tag() {
        let identity = BookIdentity::Isbn {
            value: "0306406152".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&identity).unwrap(),
            serde_json::json!({"kind": "isbn", "value": "0306406152"})
        );
    }
}
