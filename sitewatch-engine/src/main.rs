//! SiteWatch Engine - Main entry point
//!
//! Wires the alert feed, detector client, and HTTP/SSE surface together:
//! restore the persisted feed snapshot, purge anything stale (startup
//! reconciliation), then serve until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitewatch_common::config;
use sitewatch_common::db::init_database;
use sitewatch_common::events::EventBus;
use sitewatch_engine::alerts::{AlertFeed, DEFAULT_CAPACITY, DEFAULT_PURGE_HORIZON_HOURS};
use sitewatch_engine::vision::{DetectionClassifier, DetectorClient};
use sitewatch_engine::{api, AppContext};

/// Command-line arguments for sitewatch-engine
#[derive(Parser, Debug)]
#[command(name = "sitewatch-engine")]
#[command(about = "Risk scoring and alert aggregation engine for SiteWatch")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5810", env = "SITEWATCH_PORT")]
    port: u16,

    /// Data folder for the alert snapshot database
    #[arg(short, long, env = "SITEWATCH_DATA")]
    data_folder: Option<PathBuf>,

    /// Base URL of the PPE inference service
    #[arg(
        long,
        default_value = "http://127.0.0.1:8000",
        env = "SITEWATCH_DETECTOR_URL"
    )]
    detector_url: String,

    /// Maximum number of alerts retained in the live feed
    #[arg(long, default_value_t = DEFAULT_CAPACITY, env = "SITEWATCH_FEED_CAPACITY")]
    feed_capacity: usize,

    /// Minimum detection confidence considered by the classifier
    #[arg(long, default_value_t = 0.0, env = "SITEWATCH_MIN_CONFIDENCE")]
    min_confidence: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitewatch_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting SiteWatch engine on port {}", args.port);

    let data_folder = config::resolve_data_folder(args.data_folder.as_deref())
        .context("Failed to resolve data folder")?;
    info!("Data folder: {}", data_folder.display());

    let pool = init_database(&data_folder.join("sitewatch.db"))
        .await
        .context("Failed to initialize database")?;

    let events = EventBus::new(1000);
    let feed = Arc::new(AlertFeed::with_store(
        args.feed_capacity,
        events,
        pool,
    ));

    // Startup reconciliation: restore the last snapshot, drop stale entries
    feed.load().await.context("Failed to restore alert snapshot")?;
    feed.purge_stale(chrono::Duration::hours(DEFAULT_PURGE_HORIZON_HOURS))
        .await;

    let ctx = AppContext {
        feed: feed.clone(),
        detector: Arc::new(DetectorClient::new(args.detector_url)),
        classifier: Arc::new(DetectionClassifier::with_min_confidence(
            args.min_confidence,
        )),
    };

    api::server::run(ctx, args.port).await?;

    // Flush a final snapshot so the next start reconciles cleanly
    if let Err(e) = feed.flush().await {
        tracing::warn!("Final snapshot write failed: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
