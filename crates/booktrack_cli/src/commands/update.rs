//! `update` command

use super::{open_database, CommandResult};
use crate::args::{
    parse_author, parse_genres, parse_state, parse_timestamp, parse_title, BookArgs, GenreList,
};
use crate::config::AppConfig;
use crate::output::book_card;
use booktrack_core::{BookService, ReadingState, SqliteBookRepository, UpdateRequest};
use clap::Args;

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub book: BookArgs,

    /// Attach or replace the ISBN number of the book
    #[arg(long)]
    pub isbn: Option<String>,

    /// The new title of the book
    #[arg(short = 't', long = "title", value_parser = parse_title)]
    pub new_title: Option<String>,

    /// The new author of the book
    #[arg(short = 'a', long = "author", value_parser = parse_author)]
    pub new_author: Option<String>,

    /// The name of the series the book belongs to; empty clears it
    #[arg(long, visible_alias = "se")]
    pub series: Option<String>,

    /// The state of the book; written as given
    #[arg(long, visible_alias = "st", value_parser = parse_state)]
    pub state: Option<ReadingState>,

    /// The date you started the book (YYYY-MM-DDTHH:MM:SS)
    #[arg(short = 's', long, value_parser = parse_timestamp)]
    pub started: Option<i64>,

    /// The date you finished the book (YYYY-MM-DDTHH:MM:SS)
    #[arg(short = 'f', long, value_parser = parse_timestamp)]
    pub finished: Option<i64>,

    /// Replace the genres with a comma separated list
    #[arg(short = 'g', long, value_parser = parse_genres)]
    pub genres: Option<GenreList>,
}

pub fn execute(config: &AppConfig, args: UpdateArgs) -> CommandResult {
    let conn = open_database(config)?;
    let service = BookService::new(SqliteBookRepository::try_new(&conn)?);
    let stored = service.update(&UpdateRequest {
        identity: args.book.identity(config.isbn_mode, args.isbn.as_deref()),
        title: args.new_title,
        author: args.new_author,
        series: args.series,
        state: args.state,
        started_at: args.started,
        finished_at: args.finished,
        genres: args.genres.map(|genres| genres.0),
    })?;

    println!("updated:\n{}", book_card(&stored));
    Ok(())
}
