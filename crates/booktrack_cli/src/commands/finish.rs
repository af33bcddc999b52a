//! `finish` command

use super::{open_database, CommandResult};
use crate::args::{parse_state, parse_timestamp, BookArgs};
use crate::config::AppConfig;
use crate::output::book_card;
use booktrack_core::{BookService, FinishRequest, ReadingState, SqliteBookRepository};
use clap::Args;

#[derive(Debug, Args)]
pub struct FinishArgs {
    #[command(flatten)]
    pub book: BookArgs,

    /// Final state: finished (default) or dnf
    #[arg(long, visible_alias = "st", value_parser = parse_state)]
    pub state: Option<ReadingState>,

    /// The date you finished the book (YYYY-MM-DDTHH:MM:SS, default now)
    #[arg(short = 'f', long, value_parser = parse_timestamp)]
    pub finished: Option<i64>,
}

pub fn execute(config: &AppConfig, args: FinishArgs) -> CommandResult {
    let conn = open_database(config)?;
    let service = BookService::new(SqliteBookRepository::try_new(&conn)?);
    let stored = service.finish(&FinishRequest {
        identity: args.book.identity(config.isbn_mode, None),
        state: args.state,
        finished_at: args.finished,
    })?;

    println!("finished:\n{}", book_card(&stored));
    Ok(())
}
