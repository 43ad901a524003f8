use std::time::Duration;

use reqwest::{Client, header};
use tracing::info;

use crate::error::{Result, ScrapeError};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "es-MX,es;q=0.9,en;q=0.8";

/// Listing page URL for one venue and ISO date.
pub fn listing_url(base_url: &str, venue_id: &str, date: &str) -> String {
    format!(
        "{}/cartelera.php?cinemaId={}&dia={}",
        base_url.trim_end_matches('/'),
        venue_id,
        date
    )
}

/// Source of raw listing markup.
#[async_trait::async_trait]
pub trait ListingFetcher: Send + Sync {
    /// URL the listing for `venue_id` on `date` is fetched from.
    fn listing_url(&self, venue_id: &str, date: &str) -> String;

    /// Fetch the raw markup of the listing page.
    async fn fetch(&self, venue_id: &str, date: &str) -> Result<String>;
}

/// Fetches listing pages over HTTP, posing as a desktop browser.
/// The upstream site strips its markup for clients without these headers.
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ListingFetcher for HttpFetcher {
    fn listing_url(&self, venue_id: &str, date: &str) -> String {
        listing_url(&self.base_url, venue_id, date)
    }

    async fn fetch(&self, venue_id: &str, date: &str) -> Result<String> {
        let url = self.listing_url(venue_id, date);
        info!("Fetching listing from {}", url);

        let resp = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, ACCEPT)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        Ok(resp.text().await?)
    }
}
