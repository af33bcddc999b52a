//! Shared argument shapes and per-field validators.
//!
//! Validators run as clap value parsers, so a malformed flag is rejected
//! before any command touches the database.

use booktrack_core::model::genres::{decode_genres, normalize_genres};
use booktrack_core::{IdentityInput, ReadingState};
use chrono::{Local, NaiveDateTime, TimeZone};
use clap::Args;

/// Accepted timestamp layout, interpreted in local time.
pub const TIMESTAMP_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

/// Positional `[[title author]|ISBN]` arguments.
#[derive(Debug, Args)]
pub struct BookArgs {
    /// Title of the book, or its ISBN with -I
    pub title: Option<String>,
    /// Author of the book
    pub author: Option<String>,
}

impl BookArgs {
    pub fn identity(&self, isbn_mode: bool, isbn_flag: Option<&str>) -> IdentityInput {
        IdentityInput {
            isbn_mode,
            title: self.title.clone().unwrap_or_default(),
            author: self.author.clone().unwrap_or_default(),
            isbn_flag: isbn_flag.map(str::to_string),
        }
    }
}

/// Comma separated genre names after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreList(pub Vec<String>);

pub fn parse_state(value: &str) -> Result<ReadingState, String> {
    value.parse::<ReadingState>().map_err(|err| err.to_string())
}

/// Parses `YYYY-MM-DDTHH:MM:SS` local time into epoch seconds.
pub fn parse_timestamp(value: &str) -> Result<i64, String> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_LAYOUT).map_err(|_| {
        format!("'{value}' is not a valid date, expected the layout YYYY-MM-DDTHH:MM:SS")
    })?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.timestamp())
        .ok_or_else(|| format!("'{value}' does not exist in the local time zone"))
}

pub fn parse_non_empty(field: &str, value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err(format!("{field} can not be empty"));
    }
    Ok(value.to_string())
}

pub fn parse_title(value: &str) -> Result<String, String> {
    parse_non_empty("title", value)
}

pub fn parse_author(value: &str) -> Result<String, String> {
    parse_non_empty("author", value)
}

/// Splits on unescaped commas; `\,` keeps a comma inside one genre.
pub fn parse_genres(value: &str) -> Result<GenreList, String> {
    Ok(GenreList(normalize_genres(&decode_genres(value))))
}
