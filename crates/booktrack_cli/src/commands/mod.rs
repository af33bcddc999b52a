//! Command implementations.

pub mod add;
pub mod finish;
pub mod list;
pub mod remove;
pub mod search;
pub mod start;
pub mod update;

use crate::config::AppConfig;
use booktrack_core::db::open_db;
use booktrack_core::{
    resolve_identity, search_catalog, CatalogEntry, IdentityInput, OpenLibraryClient,
};
use rusqlite::Connection;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Opens (creating and migrating if needed) the configured database.
pub fn open_database(config: &AppConfig) -> Result<Connection, Box<dyn std::error::Error>> {
    Ok(open_db(&config.db_path)?)
}

/// Fetches catalog details for `--lookup` in ISBN mode.
///
/// The identity is resolved first so malformed input never reaches the
/// network.
pub fn catalog_details(
    config: &AppConfig,
    identity: &IdentityInput,
) -> Result<Option<CatalogEntry>, Box<dyn std::error::Error>> {
    if !config.lookup {
        return Ok(None);
    }
    if !config.isbn_mode {
        return Err("--lookup requires -I/--ISBN".into());
    }
    resolve_identity(identity)?;
    let client = OpenLibraryClient::new()?;
    Ok(Some(search_catalog(&client, &identity.title)?))
}
