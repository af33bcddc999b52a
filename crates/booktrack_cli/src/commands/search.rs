//! `search` command

use super::CommandResult;
use booktrack_core::{search_catalog, OpenLibraryClient};
use clap::Args;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// ISBN number to look up
    pub isbn: String,
}

pub fn execute(args: SearchArgs) -> CommandResult {
    let client = OpenLibraryClient::new()?;
    let entry = search_catalog(&client, &args.isbn)?;

    println!("title: {}", entry.title);
    println!("author: {}", entry.author_line());
    Ok(())
}
