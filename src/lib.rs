use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod aggregator;
pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod locator;
pub mod server;

pub use aggregator::Aggregator;
pub use error::{Result, ScrapeError};
pub use fetcher::{HttpFetcher, ListingFetcher};

/// Placeholder ticket link for a showtime with no booking URL.
pub const PLACEHOLDER_LINK: &str = "#";

/// One venue scraped independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueConfig {
    pub id: String,
    pub name: String,
}

impl VenueConfig {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Normalized film data extracted from one candidate block.
///
/// `showtimes` and `ticket_links` always have the same length: every
/// showtime carries a link, [`PLACEHOLDER_LINK`] when none was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub title: String,
    pub showtimes: Vec<String>,
    pub ticket_links: Vec<String>,
    pub image: String,
    pub room: String,
    pub director: String,
    pub year: String,
    pub duration: String,
    pub location: String,
}

/// Outcome of one venue in one extraction run.
#[derive(Debug, Clone)]
pub struct VenueResult {
    pub venue: VenueConfig,
    pub movies: Vec<MovieRecord>,
    pub containers_found: usize,
    pub url: String,
    pub error: Option<String>,
}

impl VenueResult {
    pub fn failed(venue: &VenueConfig, url: String, error: &ScrapeError) -> Self {
        Self {
            venue: venue.clone(),
            movies: Vec::new(),
            containers_found: 0,
            url,
            error: Some(error.to_string()),
        }
    }

    pub fn summary(&self) -> VenueSummary {
        VenueSummary {
            cinema_id: self.venue.id.clone(),
            location: self.venue.name.clone(),
            total_found: self.movies.len(),
            containers_found: self.containers_found,
            url: self.url.clone(),
            error: self.error.clone(),
        }
    }
}

/// Per-venue diagnostics reported alongside the movies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueSummary {
    pub cinema_id: String,
    pub location: String,
    pub total_found: usize,
    pub containers_found: usize,
    pub url: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub total_found: usize,
    pub timestamp: DateTime<Utc>,
    pub cinemas: Vec<VenueSummary>,
    /// Request URL, set by the HTTP surface on error responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The only externally visible artifact of a run. Rebuilt on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub movies: Vec<MovieRecord>,
    pub debug: DebugInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResponse {
    /// Flatten venue results in iteration order.
    pub fn from_results(date: String, results: Vec<VenueResult>) -> Self {
        let cinemas = results.iter().map(VenueResult::summary).collect();
        let movies: Vec<MovieRecord> = results.into_iter().flat_map(|r| r.movies).collect();
        Self {
            debug: DebugInfo {
                date: Some(date),
                total_found: movies.len(),
                timestamp: Utc::now(),
                cinemas,
                url: None,
            },
            movies,
            error: None,
        }
    }

    /// Well-formed empty response carrying `error`.
    pub fn failure(date: Option<String>, error: &ScrapeError) -> Self {
        Self {
            movies: Vec::new(),
            debug: DebugInfo {
                date,
                total_found: 0,
                timestamp: Utc::now(),
                cinemas: Vec::new(),
                url: None,
            },
            error: Some(error.to_string()),
        }
    }
}
