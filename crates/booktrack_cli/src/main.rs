//! booktrack CLI
//!
//! Command-line interface for tracking the books you read.

use clap::{Parser, Subcommand};

mod args;
mod commands;
mod config;
mod output;

#[derive(Debug, Parser)]
#[command(name = "booktrack")]
#[command(about = "booktrack - track your books locally", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: config::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a new book with any known history
    Add(commands::add::AddArgs),
    /// Start a book
    Start(commands::start::StartArgs),
    /// Finish a book that you started
    Finish(commands::finish::FinishArgs),
    /// Update info about a book
    Update(commands::update::UpdateArgs),
    /// Remove a book from the database
    Remove(commands::remove::RemoveArgs),
    /// List the books in the database
    List(commands::list::ListArgs),
    /// Look up an ISBN number on Open Library
    Search(commands::search::SearchArgs),
}

fn main() {
    let cli = Cli::parse();

    let config = config::AppConfig::from_args(&cli.global);
    if let Err(e) = config.init_logging() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Add(args) => commands::add::execute(&config, args),
        Commands::Start(args) => commands::start::execute(&config, args),
        Commands::Finish(args) => commands::finish::execute(&config, args),
        Commands::Update(args) => commands::update::execute(&config, args),
        Commands::Remove(args) => commands::remove::execute(&config, args),
        Commands::List(args) => commands::list::execute(&config, args),
        Commands::Search(args) => commands::search::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
