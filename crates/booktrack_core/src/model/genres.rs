//! Genre list text encoding for `books.genres`.
//!
//! # Invariants
//! - Names are joined with `,`; inside a name `\` is written as `\\` and `,`
//!   as `\,`.
//! - Names are trimmed and empty names dropped before encoding, so `""`
//!   decodes to an empty list.
//! - Order is preserved across encode/decode.

const DELIMITER: char = ',';
const ESCAPE: char = '\\';

/// Trims names and drops empty ones, keeping insertion order.
pub fn normalize_genres<S: AsRef<str>>(genres: &[S]) -> Vec<String> {
    genres
        .iter()
        .map(|genre| genre.as_ref().trim())
        .filter(|genre| !genre.is_empty())
        .map(str::to_string)
        .collect()
}

/// Encodes genres into the persisted column text.
pub fn encode_genres<S: AsRef<str>>(genres: &[S]) -> String {
    let mut encoded = String::new();
    for (index, genre) in normalize_genres(genres).iter().enumerate() {
        if index > 0 {
            encoded.push(DELIMITER);
        }
        for ch in genre.chars() {
            if ch == DELIMITER || ch == ESCAPE {
                encoded.push(ESCAPE);
            }
            encoded.push(ch);
        }
    }
    encoded
}

/// Decodes persisted column text into genre names.
///
/// A trailing lone escape is kept as a literal backslash.
pub fn decode_genres(encoded: &str) -> Vec<String> {
    let mut genres = Vec::new();
    let mut current = String::new();
    let mut chars = encoded.chars();
    while let Some(ch) = chars.next() {
        match ch {
            ESCAPE => current.push(chars.next().unwrap_or(ESCAPE)),
            DELIMITER => genres.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    genres.push(current);
    normalize_genres(&genres)
}
