use std::collections::HashMap;
use std::time::Duration;

use cartelera_scrape::config::ScrapeConfig;
use cartelera_scrape::fetcher::listing_url;
use cartelera_scrape::{Aggregator, ListingFetcher, Result, ScrapeError, VenueConfig};

const BASE: &str = "https://cine.test/sedes";

const NACIONAL: &str = r#"<!DOCTYPE html>
<html><body>
<div class="row">
  <div class="col-12 col-md-6 col-lg-4 float-left">
    <img class="img-fluid" src="https://cine.test/img/1.jpg">
    <p class="font-weight-bold text-uppercase text-decoration-none text-black">LA CIÉNAGA</p>
    <div class="small">Dir.: Lucrecia Martel, Argentina, 2001, Dur.: 103 mins</div>
    <p>SALA 3A Xoco</p>
    <a href="https://boletos.test/a">16:00</a>
    <a href="https://boletos.test/b">19:30</a>
  </div>
  <div class="col-12 col-md-6 col-lg-4 float-left">
    <p class="font-weight-bold text-uppercase text-decoration-none text-black">ROMA</p>
    <div class="small">Dir.: Alfonso Cuarón, 2018</div>
    <p>SALA 1
    12:00 | 15:00</p>
  </div>
  <div class="col-12 col-md-6 col-lg-4 float-left">
    <p class="small">Próximamente</p>
  </div>
</div>
</body></html>"#;

const CENART: &str = r#"<html><body>
<div class="col-12 col-xxl-3">
  <p class="font-weight-bold text-uppercase text-decoration-none text-black">EL ESPINAZO DEL DIABLO</p>
  <span class="badge badge-pill">20:00</span>
  <p>Sala Ripstein CENART</p>
</div>
</body></html>"#;

/// Serves canned markup per venue id; unknown ids fail like a refused connection.
struct StubFetcher {
    pages: HashMap<&'static str, std::result::Result<&'static str, u16>>,
}

#[async_trait::async_trait]
impl ListingFetcher for StubFetcher {
    fn listing_url(&self, venue_id: &str, date: &str) -> String {
        listing_url(BASE, venue_id, date)
    }

    async fn fetch(&self, venue_id: &str, _date: &str) -> Result<String> {
        match self.pages.get(venue_id) {
            Some(Ok(markup)) => Ok(markup.to_string()),
            Some(Err(status)) => Err(ScrapeError::Status(*status)),
            None => Err(ScrapeError::Parse(format!("no page for {venue_id}"))),
        }
    }
}

fn aggregator(pages: HashMap<&'static str, std::result::Result<&'static str, u16>>) -> Aggregator<StubFetcher> {
    let config = ScrapeConfig {
        base_url: BASE.to_string(),
        venues: vec![
            VenueConfig::new("003", "Cineteca Nacional"),
            VenueConfig::new("002", "Cineteca CENART"),
        ],
        failure_delay: Duration::from_millis(10),
        ..ScrapeConfig::default()
    };
    Aggregator::new(StubFetcher { pages }, config).unwrap()
}

#[tokio::test]
async fn flattens_venues_in_iteration_order() {
    let agg = aggregator(HashMap::from([("003", Ok(NACIONAL)), ("002", Ok(CENART))]));
    let response = agg.run(Some("2024-03-15")).await;

    let titles: Vec<_> = response.movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["LA CIÉNAGA", "ROMA", "EL ESPINAZO DEL DIABLO"]);
    assert!(response.error.is_none());

    let cienaga = &response.movies[0];
    assert_eq!(cienaga.director, "Lucrecia Martel");
    assert_eq!(cienaga.year, "2001");
    assert_eq!(cienaga.duration, "103 mins");
    assert_eq!(cienaga.room, "Sala 3A");
    assert_eq!(cienaga.image, "https://cine.test/img/1.jpg");
    assert_eq!(cienaga.showtimes, vec!["16:00", "19:30"]);
    assert_eq!(cienaga.ticket_links, vec!["https://boletos.test/a", "https://boletos.test/b"]);
    assert_eq!(cienaga.location, "Cineteca Nacional");

    let roma = &response.movies[1];
    assert_eq!(roma.showtimes, vec!["12:00", "15:00"]);
    assert_eq!(roma.ticket_links, vec!["#", "#"]);
    assert_eq!(roma.duration, "");

    let espinazo = &response.movies[2];
    assert_eq!(espinazo.location, "Cineteca CENART");
    assert_eq!(espinazo.room, "Sala Ripstein");
    assert_eq!(espinazo.ticket_links, vec!["#"]);

    for movie in &response.movies {
        assert!(!movie.title.is_empty());
        assert_eq!(movie.showtimes.len(), movie.ticket_links.len());
    }
}

#[tokio::test]
async fn debug_metadata_per_venue() {
    let agg = aggregator(HashMap::from([("003", Ok(NACIONAL)), ("002", Ok(CENART))]));
    let response = agg.run(Some("2024-03-15")).await;

    assert_eq!(response.debug.date.as_deref(), Some("2024-03-15"));
    assert_eq!(response.debug.total_found, 3);

    let nacional = &response.debug.cinemas[0];
    assert_eq!(nacional.cinema_id, "003");
    assert_eq!(nacional.location, "Cineteca Nacional");
    assert_eq!(nacional.total_found, 2);
    // The titleless card still counts as a container.
    assert_eq!(nacional.containers_found, 3);
    assert_eq!(nacional.url, "https://cine.test/sedes/cartelera.php?cinemaId=003&dia=2024-03-15");
    assert_eq!(nacional.error, None);

    let cenart = &response.debug.cinemas[1];
    assert_eq!(cenart.total_found, 1);
    assert_eq!(cenart.containers_found, 1);
}

#[tokio::test]
async fn failed_venue_does_not_abort_batch() {
    let agg = aggregator(HashMap::from([("003", Err(503)), ("002", Ok(CENART))]));
    let response = agg.run(Some("2024-03-15")).await;

    assert_eq!(response.movies.len(), 1);
    assert_eq!(response.movies[0].location, "Cineteca CENART");
    assert!(response.error.is_none());

    let failed = &response.debug.cinemas[0];
    assert_eq!(failed.total_found, 0);
    assert_eq!(failed.containers_found, 0);
    assert_eq!(failed.error.as_deref(), Some("HTTP error! status: 503"));
    assert_eq!(failed.url, "https://cine.test/sedes/cartelera.php?cinemaId=003&dia=2024-03-15");
    assert_eq!(response.debug.cinemas[1].error, None);
}

#[tokio::test]
async fn total_upstream_failure_is_well_formed() {
    let agg = aggregator(HashMap::new());
    let response = agg.run(Some("2024-03-15")).await;

    assert!(response.movies.is_empty());
    assert_eq!(response.debug.total_found, 0);
    assert_eq!(response.debug.cinemas.len(), 2);
    assert!(response.debug.cinemas.iter().all(|c| c.error.is_some()));
}

#[tokio::test]
async fn empty_markup_is_isolated_to_its_venue() {
    let agg = aggregator(HashMap::from([("003", Ok("   ")), ("002", Ok(CENART))]));
    let response = agg.run(Some("2024-03-15")).await;

    assert_eq!(response.movies.len(), 1);
    assert!(response.debug.cinemas[0].error.as_deref().unwrap().starts_with("Failed to parse HTML"));
}

#[tokio::test]
async fn unusable_cards_do_not_drop_their_siblings() {
    const MIXED: &str = r#"<html><body>
<div class="movie-card"><span class="badge">11:00</span></div>
<div class="movie-card">
  <p class="font-weight-bold text-uppercase text-decoration-none text-black">ROMA</p>
  <a href="https://boletos.test/1">16:00</a>
  <a href="http://[broken">19:45</a>
</div>
<div class="movie-card">
  <p class="font-weight-bold text-uppercase text-decoration-none text-black">AMORES PERROS</p>
  <a href="compra.php?id=7">21:00</a>
</div>
</body></html>"#;

    let agg = aggregator(HashMap::from([("003", Ok(MIXED)), ("002", Ok(CENART))]));
    let response = agg.run(Some("2024-03-15")).await;

    let titles: Vec<_> = response.movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["ROMA", "AMORES PERROS", "EL ESPINAZO DEL DIABLO"]);

    let roma = &response.movies[0];
    assert_eq!(roma.showtimes, vec!["16:00", "19:45"]);
    assert_eq!(roma.ticket_links, vec!["https://boletos.test/1", "http://[broken"]);
    assert_eq!(response.movies[1].ticket_links, vec!["https://cine.test/sedes/compra.php?id=7"]);

    let nacional = &response.debug.cinemas[0];
    assert_eq!(nacional.containers_found, 3);
    assert_eq!(nacional.total_found, 2);
    assert_eq!(nacional.error, None);
}

#[tokio::test]
async fn missing_date_yields_error_response() {
    let agg = aggregator(HashMap::from([("003", Ok(NACIONAL))]));

    for date in [None, Some(""), Some("  ")] {
        let response = agg.run(date).await;
        assert!(response.movies.is_empty());
        assert_eq!(response.error.as_deref(), Some("Date parameter is required"));
        assert!(response.debug.cinemas.is_empty());
    }
}

#[tokio::test]
async fn malformed_date_yields_error_response() {
    let agg = aggregator(HashMap::from([("003", Ok(NACIONAL))]));
    let response = agg.run(Some("mañana")).await;

    assert!(response.movies.is_empty());
    assert_eq!(
        response.error.as_deref(),
        Some("Invalid date parameter: mañana, expected YYYY-MM-DD")
    );
}

#[tokio::test]
async fn response_serializes_with_camel_case_keys() {
    let agg = aggregator(HashMap::from([("003", Ok(NACIONAL)), ("002", Err(500))]));
    let response = agg.run(Some("2024-03-15")).await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["movies"][0]["ticketLinks"][0], "https://boletos.test/a");
    assert_eq!(json["debug"]["totalFound"], 2);
    assert_eq!(json["debug"]["cinemas"][1]["containersFound"], 0);
    assert_eq!(json["debug"]["cinemas"][1]["error"], "HTTP error! status: 500");
    assert!(json["debug"]["cinemas"][0]["error"].is_null());
    assert!(json.get("error").is_none());
}
