//! Process-wide CLI configuration.
//!
//! # Responsibility
//! - Collect global flags and their environment fallbacks.
//! - Start file logging when a log directory is configured.

use booktrack_core::{default_log_level, init_logging, LoggingError};
use clap::Args;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "books.db";

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Use ISBN instead of title and author pair
    #[arg(short = 'I', long = "ISBN", global = true)]
    pub isbn_mode: bool,

    /// Use Open Library to look up details about a book and store them
    #[arg(short = 'L', long = "lookup", global = true)]
    pub lookup: bool,

    /// Path of the SQLite books database
    #[arg(long, env = "BOOKTRACK_DB", default_value = DEFAULT_DB_PATH, global = true)]
    pub db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "BOOKTRACK_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "BOOKTRACK_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

/// Resolved configuration shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub isbn_mode: bool,
    pub lookup: bool,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_args(args: &GlobalArgs) -> Self {
        Self {
            db_path: args.db.clone(),
            isbn_mode: args.isbn_mode,
            lookup: args.lookup,
            log_level: args
                .log_level
                .clone()
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: args.log_dir.clone(),
        }
    }

    /// Starts logging; a no-op without a log directory.
    pub fn init_logging(&self) -> Result<(), LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, dir),
            None => Ok(()),
        }
    }
}
