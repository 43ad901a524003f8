use chrono::NaiveDate;
use reqwest::Url;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ScrapeConfig;
use crate::document::Document;
use crate::error::{Result, ScrapeError};
use crate::extractor::FieldExtractor;
use crate::fetcher::{HttpFetcher, ListingFetcher};
use crate::locator::ContainerLocator;
use crate::{ExtractionResponse, MovieRecord, VenueConfig, VenueResult};

/// Movies pulled from one listing page.
#[derive(Debug, Clone, Default)]
pub struct VenueExtraction {
    pub movies: Vec<MovieRecord>,
    pub containers_found: usize,
}

/// Accept a non-blank `YYYY-MM-DD` date and return it in canonical form.
pub fn validate_date(date: Option<&str>) -> Result<String> {
    let date = date
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(ScrapeError::MissingDate)?;
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ScrapeError::InvalidDate(date.to_string()))?;
    Ok(parsed.format("%Y-%m-%d").to_string())
}

/// Runs fetch, parse, locate and extract for every configured venue.
///
/// Venues are processed one at a time. A venue that fails contributes an
/// error entry and no movies, then the aggregator waits
/// `config.failure_delay` before moving on so a struggling upstream is not
/// hammered. Nothing is shared between runs.
pub struct Aggregator<F> {
    fetcher: F,
    config: ScrapeConfig,
    locator: ContainerLocator,
    extractor: FieldExtractor,
}

impl Aggregator<HttpFetcher> {
    pub fn from_config(config: ScrapeConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.base_url, config.http_timeout)?;
        Self::new(fetcher, config)
    }
}

impl<F: ListingFetcher> Aggregator<F> {
    pub fn new(fetcher: F, config: ScrapeConfig) -> Result<Self> {
        let locator = ContainerLocator::new(&config.selectors)?;
        let extractor = FieldExtractor::new(&config.selectors)?;
        Ok(Self {
            fetcher,
            config,
            locator,
            extractor,
        })
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Entry point: movies for `date` across all venues.
    ///
    /// Never fails; problems are reported through `error` fields of the response.
    pub async fn run(&self, date: Option<&str>) -> ExtractionResponse {
        let date = match validate_date(date) {
            Ok(d) => d,
            Err(e) => {
                warn!("Rejecting request: {}", e);
                return ExtractionResponse::failure(date.map(str::to_string), &e);
            }
        };

        let mut results = Vec::with_capacity(self.config.venues.len());
        for venue in &self.config.venues {
            let url = self.fetcher.listing_url(&venue.id, &date);
            match self.scrape_venue(venue, &date, &url).await {
                Ok(extraction) => results.push(VenueResult {
                    venue: venue.clone(),
                    movies: extraction.movies,
                    containers_found: extraction.containers_found,
                    url,
                    error: None,
                }),
                Err(e) => {
                    error!("Error fetching movies for {}: {}", venue.name, e);
                    results.push(VenueResult::failed(venue, url, &e));
                    tokio::time::sleep(self.config.failure_delay).await;
                }
            }
        }

        let response = ExtractionResponse::from_results(date, results);
        info!(
            "Successfully parsed {} movies across {} cinemas",
            response.movies.len(),
            response.debug.cinemas.len()
        );
        response
    }

    #[instrument(skip(self, venue, date), fields(venue = %venue.name))]
    async fn scrape_venue(&self, venue: &VenueConfig, date: &str, url: &str) -> Result<VenueExtraction> {
        let markup = self.fetcher.fetch(&venue.id, date).await?;
        info!("Received HTML for {}, length: {}", venue.name, markup.len());
        self.extract_venue(venue, url, &markup)
    }

    /// Parse one listing page and extract every recognizable film.
    /// Kept synchronous so the parsed tree never lives across an await.
    pub fn extract_venue(&self, venue: &VenueConfig, url: &str, markup: &str) -> Result<VenueExtraction> {
        let page = Url::parse(url).map_err(|e| ScrapeError::Link(format!("{url}: {e}")))?;
        let document = Document::parse(markup)?;
        let candidates = self.locator.locate(&document);
        info!(
            "Found {} potential movie containers for {}",
            candidates.len(),
            venue.name
        );

        let movies: Vec<MovieRecord> = candidates
            .iter()
            .filter_map(|candidate| self.extractor.extract(*candidate, venue, &page))
            .collect();
        debug!("{} of {} containers yielded a movie", movies.len(), candidates.len());

        Ok(VenueExtraction {
            movies,
            containers_found: candidates.len(),
        })
    }
}
