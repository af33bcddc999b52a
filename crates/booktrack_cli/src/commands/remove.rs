//! `remove` command

use super::{open_database, CommandResult};
use crate::args::BookArgs;
use crate::config::AppConfig;
use crate::output::book_line;
use booktrack_core::{BookService, SqliteBookRepository};
use clap::Args;

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub book: BookArgs,
}

pub fn execute(config: &AppConfig, args: RemoveArgs) -> CommandResult {
    let conn = open_database(config)?;
    let service = BookService::new(SqliteBookRepository::try_new(&conn)?);
    let removed = service.remove(&args.book.identity(config.isbn_mode, None))?;

    println!("removed: {}", book_line(&removed).trim_start());
    Ok(())
}
