//! Media aggregation gateway server.

use anyhow::{Context, Result};
use clap::Parser;
use media_aggregator::api::{CatalogProvider, FeedSource, MangaProvider, MetadataProvider};
use media_aggregator::{
    router, AniListClient, AppState, FeedAggregator, JikanClient, MangaDexClient, Providers,
    QueryService, RssFeedClient, ServiceSettings, TtlCache,
};
use shared::{Config, LogConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

fn build_providers(config: &Config) -> Result<Providers> {
    let metadata: Arc<dyn MetadataProvider> = Arc::new(
        AniListClient::new(
            config.metadata.endpoint.clone(),
            Duration::from_secs(config.metadata.timeout_seconds),
        )
        .context("Failed to create metadata client")?,
    );

    let catalog: Arc<dyn CatalogProvider> = Arc::new(
        JikanClient::from_config(&config.catalog).context("Failed to create catalog client")?,
    );

    let manga: Arc<dyn MangaProvider> = Arc::new(
        MangaDexClient::from_config(&config.manga).context("Failed to create manga client")?,
    );

    let feed_sources: Vec<Arc<dyn FeedSource>> = RssFeedClient::from_config(&config.feeds)
        .context("Failed to create feed clients")?
        .into_iter()
        .map(|client| {
            info!(label = %client.label(), url = %client.url(), "Feed source configured");
            Arc::new(client) as Arc<dyn FeedSource>
        })
        .collect();

    Ok(Providers {
        metadata,
        catalog,
        manga,
        feeds: FeedAggregator::new(feed_sources, config.feeds.max_items),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Initialize logging
    shared::logging::init(LogConfig::from_settings(
        &config.logging,
        "media-aggregator",
        args.verbose,
    ))?;

    info!("Media aggregator starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    let providers = build_providers(&config)?;
    info!(
        feeds = providers.feeds.source_count(),
        ttl_seconds = config.cache.ttl_seconds,
        "Providers initialized"
    );

    let service = QueryService::new(
        TtlCache::new(config.cache_ttl()),
        providers,
        ServiceSettings::from_config(&config),
    );
    let app = router(AppState::new(service));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Media aggregator stopped");
    Ok(())
}
