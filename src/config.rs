use std::time::Duration;

use crate::VenueConfig;

pub const DEFAULT_BASE_URL: &str = "https://www.cinetecanacional.net/sedes";

/// Class combinations of one "movie card" on the listing layout, most specific first.
pub const CONTAINER_SELECTORS: [&str; 6] = [
    ".col-12.col-md-6.col-lg-4.float-left",
    ".col-12.col-sm-6.col-lg-4.float-left",
    ".col-12.col-md-6.col-xl-3.float-left",
    ".col-12.col-lg-4.float-left",
    ".cartelera-card",
    ".movie-card",
];

pub const FALLBACK_COLUMN: &str = "div.col-12";
pub const TITLE_MARKER: &str = "p.font-weight-bold.text-uppercase.text-decoration-none.text-black";
pub const IMAGE_PATTERN: &str = "img.img-fluid";
pub const INFO_PATTERN: &str = "div.small";
pub const TIME_ELEMENTS: &str = "a, span.badge, span.badge-pill, span.badge-secondary";

/// Branch qualifiers the listing appends after the room label.
pub const ROOM_SUFFIXES: [&str; 2] = ["Xoco", "CENART"];

pub const FAILURE_DELAY: Duration = Duration::from_millis(500);
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const REQUEST_BUDGET: Duration = Duration::from_secs(60);

/// Structural patterns the locator and extractor look for.
/// Kept as data so layout drift upstream only needs new strings.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub containers: Vec<String>,
    pub fallback_column: String,
    pub title_marker: String,
    pub image: String,
    pub info: String,
    pub time_elements: String,
    pub room_suffixes: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            containers: CONTAINER_SELECTORS.iter().map(|s| s.to_string()).collect(),
            fallback_column: FALLBACK_COLUMN.to_string(),
            title_marker: TITLE_MARKER.to_string(),
            image: IMAGE_PATTERN.to_string(),
            info: INFO_PATTERN.to_string(),
            time_elements: TIME_ELEMENTS.to_string(),
            room_suffixes: ROOM_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Immutable pipeline configuration, fixed at process start.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub venues: Vec<VenueConfig>,
    pub selectors: SelectorConfig,
    /// Pause after a venue fails before moving on to the next one.
    pub failure_delay: Duration,
    pub http_timeout: Duration,
    pub request_budget: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            venues: default_venues(),
            selectors: SelectorConfig::default(),
            failure_delay: FAILURE_DELAY,
            http_timeout: HTTP_TIMEOUT,
            request_budget: REQUEST_BUDGET,
        }
    }
}

pub fn default_venues() -> Vec<VenueConfig> {
    vec![
        VenueConfig::new("003", "Cineteca Nacional"),
        VenueConfig::new("002", "Cineteca CENART"),
    ]
}
