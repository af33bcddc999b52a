//! `add` command

use super::{catalog_details, open_database, CommandResult};
use crate::args::{parse_genres, parse_state, parse_timestamp, BookArgs, GenreList};
use crate::config::AppConfig;
use crate::output::book_card;
use booktrack_core::{AddRequest, BookService, ReadingState, SqliteBookRepository};
use clap::Args;

#[derive(Debug, Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub book: BookArgs,

    /// The ISBN number of the book
    #[arg(long)]
    pub isbn: Option<String>,

    /// The name of the series the book belongs to
    #[arg(long, visible_alias = "se")]
    pub series: Option<String>,

    /// The state of the book: none, reading, finished, tbr or dnf (default none)
    #[arg(long, visible_alias = "st", value_parser = parse_state)]
    pub state: Option<ReadingState>,

    /// The date you started the book (YYYY-MM-DDTHH:MM:SS)
    #[arg(short = 's', long, value_parser = parse_timestamp)]
    pub started: Option<i64>,

    /// The date you finished the book (YYYY-MM-DDTHH:MM:SS)
    #[arg(short = 'f', long, value_parser = parse_timestamp)]
    pub finished: Option<i64>,

    /// A list of comma separated genres
    #[arg(short = 'g', long, value_parser = parse_genres)]
    pub genres: Option<GenreList>,
}

pub fn execute(config: &AppConfig, args: AddArgs) -> CommandResult {
    let identity = args.book.identity(config.isbn_mode, args.isbn.as_deref());
    let catalog = catalog_details(config, &identity)?;

    let conn = open_database(config)?;
    let service = BookService::new(SqliteBookRepository::try_new(&conn)?);
    let stored = service.add(&AddRequest {
        identity,
        series: args.series,
        state: args.state,
        started_at: args.started,
        finished_at: args.finished,
        genres: args.genres.map(|genres| genres.0).unwrap_or_default(),
        catalog,
    })?;

    println!("added:\n{}", book_card(&stored));
    Ok(())
}
