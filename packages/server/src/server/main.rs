// Main entry point for the scraping connector server

use std::sync::Arc;

use anyhow::{Context, Result};
use connector_core::{
    server::{build_app, AppState},
    Config,
};
use firecrawl_client::FirecrawlClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,connector_core=debug,firecrawl_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting scraping connector");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Build the upstream client
    let firecrawl = FirecrawlClient::new(config.firecrawl_api_key.clone())
        .context("Failed to create Firecrawl client")?
        .with_base_url(&config.firecrawl_base_url)
        .with_transport_policy(config.transport_policy())
        .with_polling_policy(config.polling_policy());

    let app = build_app(AppState {
        firecrawl: Arc::new(firecrawl),
    });

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
