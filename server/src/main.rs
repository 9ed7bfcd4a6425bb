//! Ratefold Server Binary
//!
//! Serves consensus exchange rates aggregated from several upstream providers.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratefold_fx::RateAggregator;
use ratefold_server::{router, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting Ratefold server");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let providers = config.providers.build_providers()?;
    let aggregator = Arc::new(RateAggregator::new(providers, config.aggregator.clone()));

    info!(
        providers = ?aggregator.provider_names(),
        "Providers registered"
    );

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;

    info!(
        listen_addr = %config.listen_addr,
        listen_port = %config.listen_port,
        "Server running"
    );

    axum::serve(listener, router(aggregator.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(cached = aggregator.cache_size(), "Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
