//! Human-readable rendering of stored books.

use booktrack_core::{title_case, StoredBook};
use chrono::{Local, TimeZone};

const DISPLAY_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";
const EMPTY: &str = "-";

/// Multi-line card for one book.
pub fn book_card(stored: &StoredBook) -> String {
    let book = &stored.book;
    let rows = [
        ("Title", text_or_empty(&title_case(&book.title))),
        ("Series", text_or_empty(book.series.as_deref().unwrap_or(""))),
        ("Author", text_or_empty(&title_case(&book.author))),
        ("ISBN", text_or_empty(book.isbn.as_deref().unwrap_or(""))),
        ("Status", book.state.to_string()),
        ("Started", format_timestamp(book.started_at)),
        ("Finished", format_timestamp(book.finished_at)),
        ("Took", book.took().map_or_else(|| EMPTY.to_string(), format_took)),
        ("Genres", text_or_empty(&book.genres.join(", "))),
    ];
    rows.iter()
        .map(|(label, value)| format!("{label:<8}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary used by `list`.
pub fn book_line(stored: &StoredBook) -> String {
    let book = &stored.book;
    let name = if book.title.is_empty() {
        EMPTY.to_string()
    } else if book.author.is_empty() {
        title_case(&book.title)
    } else {
        format!("{} by {}", title_case(&book.title), title_case(&book.author))
    };
    let isbn = book
        .isbn
        .as_deref()
        .map(|isbn| format!(" [{isbn}]"))
        .unwrap_or_default();
    format!("{:>4}  {:<8}  {name}{isbn}", stored.id, book.state.to_string())
}

pub fn format_timestamp(epoch_secs: Option<i64>) -> String {
    epoch_secs
        .and_then(|secs| Local.timestamp_opt(secs, 0).single())
        .map_or_else(
            || EMPTY.to_string(),
            |local| local.format(DISPLAY_LAYOUT).to_string(),
        )
}

/// Renders a duration as days, hours and minutes.
pub fn format_took(seconds: i64) -> String {
    let minutes = seconds / 60;
    let (days, hours, minutes) = (minutes / 1440, (minutes / 60) % 24, minutes % 60);
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn text_or_empty(value: &str) -> String {
    if value.is_empty() {
        EMPTY.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{book_card, book_line, format_timestamp, format_took};
    use booktrack_core::{BookRecord, ReadingState, StoredBook};

    fn finished_dune() -> StoredBook {
        StoredBook {
            id: 7,
            book: BookRecord {
                isbn: Some("9780441013593".to_string()),
                author: "frank herbert".to_string(),
                title: "dune".to_string(),
                series: None,
                state: ReadingState::Finished,
                started_at: Some(1_700_000_000),
                finished_at: Some(1_700_000_000 + 3 * 86_400 + 2 * 3_600 + 5 * 60),
                genres: vec!["sci-fi".to_string(), "classic".to_string()],
            },
        }
    }

    #[test]
    fn format_took_picks_largest_unit() {
        assert_eq!(format_took(59), "0m");
        assert_eq!(format_took(3_660), "1h 1m");
        assert_eq!(format_took(90_000), "1d 1h 0m");
    }

    #[test]
    fn missing_timestamp_renders_placeholder() {
        assert_eq!(format_timestamp(None), "-");
    }

    #[test]
    fn card_title_cases_and_fills_placeholders() {
        let card = book_card(&finished_dune());
        let lines: Vec<_> = card.lines().collect();
        assert_eq!(lines[0], "Title   : Dune");
        assert_eq!(lines[1], "Series  : -");
        assert_eq!(lines[2], "Author  : Frank Herbert");
        assert_eq!(lines[3], "ISBN    : 9780441013593");
        assert_eq!(lines[4], "Status  : FINISHED");
        assert_eq!(lines[7], "Took    : 3d 2h 5m");
        assert_eq!(lines[8], "Genres  : sci-fi, classic");
    }

    #[test]
    fn line_handles_isbn_only_records() {
        let mut stored = finished_dune();
        assert_eq!(
            book_line(&stored),
            "   7  FINISHED  Dune by Frank Herbert [9780441013593]"
        );

        stored.book.title.clear();
        stored.book.author.clear();
        stored.book.state = ReadingState::Reading;
        assert_eq!(book_line(&stored), "   7  READING   - [9780441013593]");
    }
}
