//! Open Library search client.
//!
//! # Responsibility
//! - Query `search.json` for one ISBN and decode the first document.
//!
//! # Invariants
//! - Only the `title` and `author_name` fields are requested.
//! - Blocking client; the command surface is synchronous.

use super::{CatalogEntry, CatalogError, CatalogLookup, CatalogResult};
use log::{error, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

pub const OPEN_LIBRARY_BASE_URL: &str = "https://openlibrary.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
}

/// Open Library catalog client.
pub struct OpenLibraryClient {
    http: Client,
    base_url: String,
}

impl OpenLibraryClient {
    /// Client against the public Open Library host.
    pub fn new() -> CatalogResult<Self> {
        Self::with_base_url(OPEN_LIBRARY_BASE_URL)
    }

    /// Client against another host serving the same API.
    pub fn with_base_url(base_url: impl Into<String>) -> CatalogResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl CatalogLookup for OpenLibraryClient {
    fn lookup_isbn(&self, isbn: &str) -> CatalogResult<CatalogEntry> {
        let started_at = Instant::now();
        info!("event=catalog_lookup module=catalog status=start provider=open_library");

        let result = self.fetch(isbn);
        match &result {
            Ok(_) => info!(
                "event=catalog_lookup module=catalog status=ok provider=open_library duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!("{}", failure_event(started_at.elapsed().as_millis(), err)),
        }
        result
    }
}

impl OpenLibraryClient {
    fn fetch(&self, isbn: &str) -> CatalogResult<CatalogEntry> {
        let response = self
            .http
            .get(format!("{}/search.json", self.base_url))
            .query(&[("q", isbn), ("fields", "title,author_name")])
            .header("Accept", "application/json")
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        parse_search_response(isbn, &body)
    }
}

fn failure_event(duration_ms: u128, err: &CatalogError) -> String {
    format!(
        "event=catalog_lookup module=catalog status=error provider=open_library duration_ms={duration_ms} error_code={}",
        err.code()
    )
}

/// Decodes a `search.json` body into the first catalog entry.
pub fn parse_search_response(isbn: &str, body: &str) -> CatalogResult<CatalogEntry> {
    let response: SearchResponse = serde_json::from_str(body)?;
    response
        .docs
        .into_iter()
        .find_map(|doc| {
            let title = doc.title?.trim().to_string();
            (!title.is_empty()).then_some(CatalogEntry {
                title,
                authors: doc.author_name,
            })
        })
        .ok_or_else(|| CatalogError::NotFound(isbn.to_string()))
}
