//! `list` command

use super::{open_database, CommandResult};
use crate::args::parse_state;
use crate::config::AppConfig;
use crate::output::book_line;
use booktrack_core::{BookListQuery, BookService, ReadingState, SqliteBookRepository};
use clap::Args;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only list books in this state
    #[arg(long, visible_alias = "st", value_parser = parse_state)]
    pub state: Option<ReadingState>,

    /// Maximum number of books to print
    #[arg(long)]
    pub limit: Option<u32>,

    /// Number of books to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Print the books as a JSON array
    #[arg(long)]
    pub json: bool,
}

pub fn execute(config: &AppConfig, args: ListArgs) -> CommandResult {
    let conn = open_database(config)?;
    let service = BookService::new(SqliteBookRepository::try_new(&conn)?);
    let books = service.list(&BookListQuery {
        state: args.state,
        limit: args.limit,
        offset: args.offset,
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&books)?);
        return Ok(());
    }
    if books.is_empty() {
        println!("no books found");
        return Ok(());
    }
    for stored in &books {
        println!("{}", book_line(stored));
    }
    Ok(())
}
