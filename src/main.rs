use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cartelera_scrape::Aggregator;
use cartelera_scrape::config::{self, ScrapeConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cartelera-scrape", about = "Scrape daily cinema listings into normalized showtimes")]
struct Cli {
    /// Listing site base URL; `/cartelera.php` is appended.
    #[arg(long, env = "CARTELERA_BASE_URL", default_value = config::DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Pause after a venue fails, in milliseconds.
    #[arg(long, env = "CARTELERA_FAILURE_DELAY_MS", default_value_t = 500, global = true)]
    failure_delay_ms: u64,

    #[arg(long, default_value_t = 30, global = true)]
    http_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape once and print the response as JSON
    Fetch {
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Serve the /fetch-movies endpoint
    Serve {
        #[arg(long, env = "CARTELERA_BIND", default_value = "0.0.0.0:8080")]
        bind: String,

        /// Upper bound for one request, in seconds.
        #[arg(long, default_value_t = 60)]
        request_budget_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,cartelera_scrape=debug".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ScrapeConfig {
        base_url: cli.base_url,
        failure_delay: Duration::from_millis(cli.failure_delay_ms),
        http_timeout: Duration::from_secs(cli.http_timeout_secs),
        ..ScrapeConfig::default()
    };

    match cli.command {
        Command::Fetch { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
            let aggregator = Aggregator::from_config(config).context("Failed to build scraper")?;
            let response = aggregator.run(Some(&date)).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Serve {
            bind,
            request_budget_secs,
        } => {
            config.request_budget = Duration::from_secs(request_budget_secs);
            let budget = config.request_budget;
            let aggregator = Aggregator::from_config(config).context("Failed to build scraper")?;
            let app = cartelera_scrape::server::router(Arc::new(aggregator), budget);

            tracing::info!("Starting server on {}", bind);
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .context("Failed to bind to address")?;
            axum::serve(listener, app).await.context("Server error")?;
        }
    }

    Ok(())
}
