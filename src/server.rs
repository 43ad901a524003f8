//! HTTP surface: one request operation returning the extraction response.
//!
//! Every answer is `200 OK` with a JSON body. Callers have to look at
//! `error`, `movies` and the per-venue errors to tell success from failure.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::aggregator::Aggregator;
use crate::error::ScrapeError;
use crate::fetcher::ListingFetcher;
use crate::ExtractionResponse;

pub struct AppState<F> {
    aggregator: Arc<Aggregator<F>>,
    request_budget: Duration,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            aggregator: Arc::clone(&self.aggregator),
            request_budget: self.request_budget,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DateParams {
    date: Option<String>,
}

pub fn router<F: ListingFetcher + 'static>(aggregator: Arc<Aggregator<F>>, request_budget: Duration) -> Router {
    let state = AppState {
        aggregator,
        request_budget,
    };

    Router::new()
        .route("/fetch-movies", get(fetch_movies::<F>).post(fetch_movies::<F>))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Date comes from a JSON body first, then from `?date=`. A blank body date
/// does not hide the query parameter.
async fn fetch_movies<F: ListingFetcher + 'static>(
    State(state): State<AppState<F>>,
    query: Option<Query<DateParams>>,
    uri: Uri,
    body: Bytes,
) -> Json<ExtractionResponse> {
    let date = date_from_body(&body)
        .filter(|d| !d.trim().is_empty())
        .or_else(|| query.and_then(|Query(q)| q.date));

    let run = state.aggregator.run(date.as_deref());
    let mut response = match tokio::time::timeout(state.request_budget, run).await {
        Ok(response) => response,
        Err(_) => {
            let err = ScrapeError::Timeout(state.request_budget);
            error!("Error fetching movies: {}", err);
            ExtractionResponse::failure(date, &err)
        }
    };
    if response.error.is_some() {
        response.debug.url = Some(uri.to_string());
    }
    Json(response)
}

fn date_from_body(body: &[u8]) -> Option<String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<DateParams>(body) {
        Ok(params) => params.date,
        Err(e) => {
            warn!("Request body could not be parsed as JSON: {}", e);
            None
        }
    }
}
