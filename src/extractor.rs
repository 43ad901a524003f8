//! Field extraction for one candidate block.
//!
//! The info line is parsed with independent patterns: a missing director
//! never hides the year or the duration. Showtimes come from links and
//! badges first; only when those give nothing is the raw text of the block
//! split on newlines and pipes.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use tracing::debug;

use crate::config::SelectorConfig;
use crate::document::{Node, Pattern};
use crate::error::{Result, ScrapeError};
use crate::{MovieRecord, PLACEHOLDER_LINK, VenueConfig};

static TIME_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{1,2}:[0-9]{2}$").unwrap());
static DIRECTOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Dir\.:\s*([^,]+)").unwrap());
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]{4})").unwrap());
static DURATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:Dur\.:\s*)?([0-9]+)\s*mins").unwrap());
static ROOM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)SALA\s+[^\n\r]*").unwrap());
static ROOM_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^SALA").unwrap());

/// True for `H:MM` / `HH:MM`. Purely syntactic, "24:00" passes.
pub fn is_time_token(text: &str) -> bool {
    TIME_TOKEN.is_match(text)
}

/// Director, year and duration pulled from the free-text info line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilmInfo {
    pub director: Option<String>,
    pub year: Option<String>,
    pub duration: Option<String>,
}

pub fn parse_info(info: &str) -> FilmInfo {
    FilmInfo {
        director: DIRECTOR
            .captures(info)
            .map(|c| c[1].trim().to_string())
            .filter(|d| !d.is_empty()),
        year: YEAR.captures(info).map(|c| c[1].to_string()),
        duration: DURATION.captures(info).map(|c| format!("{} mins", &c[1])),
    }
}

pub struct FieldExtractor {
    title_marker: Pattern,
    image: Pattern,
    info: Pattern,
    time_elements: Pattern,
    room_suffix: Option<Regex>,
}

impl FieldExtractor {
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        let room_suffix = if config.room_suffixes.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = config.room_suffixes.iter().map(|s| regex::escape(s)).collect();
            let pattern = format!(r"(?i)\s+(?:{}).*", alternatives.join("|"));
            Some(Regex::new(&pattern).map_err(|e| ScrapeError::Selector(e.to_string()))?)
        };

        Ok(Self {
            title_marker: Pattern::parse(&config.title_marker)?,
            image: Pattern::parse(&config.image)?,
            info: Pattern::parse(&config.info)?,
            time_elements: Pattern::parse(&config.time_elements)?,
            room_suffix,
        })
    }

    /// Build a record from one candidate, `None` when the block has no title.
    ///
    /// Relative links are resolved against `page`, the listing URL.
    pub fn extract(&self, candidate: Node<'_>, venue: &VenueConfig, page: &Url) -> Option<MovieRecord> {
        let title = candidate
            .first_match(&self.title_marker)
            .map(|n| n.text().trim().to_string())
            .unwrap_or_default();
        if title.is_empty() {
            debug!("Skipping container: no title found for {}", venue.name);
            return None;
        }

        let image = match candidate.first_match(&self.image).and_then(|n| n.attribute("src")) {
            Some(src) if !src.trim().is_empty() => resolve_link(page, src),
            _ => String::new(),
        };

        let info = candidate
            .first_match(&self.info)
            .map(|n| parse_info(n.text().trim()))
            .unwrap_or_default();

        let text = candidate.text();
        let (showtimes, ticket_links) = self.showtimes(candidate, &text, page);
        let room = self.room(&text).unwrap_or_default();

        debug!(
            "Parsed movie: \"{}\", {} showtimes, room: {}, location: {}",
            title,
            showtimes.len(),
            room,
            venue.name
        );

        Some(MovieRecord {
            title,
            showtimes,
            ticket_links,
            image,
            room,
            director: info.director.unwrap_or_default(),
            year: info.year.unwrap_or_default(),
            duration: info.duration.unwrap_or_default(),
            location: venue.name.clone(),
        })
    }

    fn showtimes(&self, candidate: Node<'_>, text: &str, page: &Url) -> (Vec<String>, Vec<String>) {
        let mut showtimes: Vec<String> = Vec::new();
        let mut links = Vec::new();

        for element in candidate.select_all(&self.time_elements) {
            let content = element.text();
            let time = content.trim();
            if !is_time_token(time) || showtimes.iter().any(|t| t == time) {
                continue;
            }
            let link = match element.attribute("href") {
                Some(href) if element.tag() == "a" => resolve_link(page, href),
                _ => PLACEHOLDER_LINK.to_string(),
            };
            showtimes.push(time.to_string());
            links.push(link);
        }

        if showtimes.is_empty() {
            // Plain-text listings: "16:00 | 18:30" or one time per line.
            for segment in text.split(['\n', '|']).map(str::trim) {
                if is_time_token(segment) && !showtimes.iter().any(|t| t == segment) {
                    showtimes.push(segment.to_string());
                    links.push(PLACEHOLDER_LINK.to_string());
                }
            }
        }

        (showtimes, links)
    }

    /// "SALA 3A Xoco ..." becomes "Sala 3A".
    fn room(&self, text: &str) -> Option<String> {
        let found = ROOM.find(text)?.as_str();
        let trimmed = match &self.room_suffix {
            Some(suffix) => suffix.replace(found, ""),
            None => found.into(),
        };
        let room = ROOM_PREFIX.replace(&trimmed, "Sala").trim().to_string();
        Some(room)
    }
}

/// Resolve `href` against the listing URL. Absolute URLs and fragments are
/// kept verbatim, an empty target becomes the placeholder, and anything
/// that cannot be joined is kept as written.
fn resolve_link(page: &Url, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return PLACEHOLDER_LINK.to_string();
    }
    if href.starts_with('#') || Url::parse(href).is_ok() {
        return href.to_string();
    }
    match page.join(href) {
        Ok(url) => url.to_string(),
        Err(e) => {
            debug!("Keeping unresolvable link {} as is: {}", href, e);
            href.to_string()
        }
    }
}
