//! receiverd - receiver management and notification dispatch
//!
//! Stores alert receivers (Slack, PagerDuty, HTTP) and delivers
//! notifications to them over an HTTP API.

use anyhow::Result;
use clap::Parser;
use receiverd::{app::App, cli::Cli, config::Config};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        tracing_subscriber::fmt().init();
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    // RUST_LOG, when set, wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("receiverd starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Listen Address: {}", config.server.listen_address);
    info!(
        "Metrics: {}",
        if config.metrics.enabled { "Enabled" } else { "Disabled" }
    );
    info!("Slack API: {}", config.slack.api_base_url);
    info!("PagerDuty Events URL: {}", config.pagerduty.events_url);
    info!(
        "Timeouts: slack={}s pagerduty={}s http={}s",
        config.slack.timeout_seconds, config.pagerduty.timeout_seconds, config.http.timeout_seconds
    );
    info!("-------------------------------------------------------");

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let app = App::builder(config).build(shutdown_rx).await?;
    info!("receiverd initialized successfully on {}.", app.addr());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Shutting down gracefully...");
    if shutdown_tx.send(()).is_err() {
        warn!("No task was listening for the shutdown signal.");
    }

    app.run().await?;
    info!("Exiting.");
    Ok(())
}
