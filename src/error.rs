use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Date parameter is required")]
    MissingDate,

    #[error("Invalid date parameter: {0}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Failed to parse HTML: {0}")]
    Parse(String),

    #[error("selector error: {0}")]
    Selector(String),

    #[error("Invalid listing URL {0}")]
    Link(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
