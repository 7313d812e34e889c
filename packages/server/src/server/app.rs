//! Application setup and router construction.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use firecrawl_client::FirecrawlClient;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::routes::{
    crawl_handler, extract_handler, extract_job_handler, health_handler, map_handler,
    scrape_handler, search_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub firecrawl: Arc<FirecrawlClient>,
}

/// Build the Axum application router
///
/// All scraping endpoints sit behind the rate limiter; the health check
/// is registered afterwards so probes are never throttled.
pub fn build_app(state: AppState) -> Router {
    // Permissive CORS; the connector sits behind a workflow runtime,
    // not a browser audience.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Per-IP rate limit: 10 req/s, bursts to 20. Keyed on
    // X-Forwarded-For when a proxy sets it, peer address otherwise.
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers()
            .finish()
            .expect("static rate limiter settings"),
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    Router::new()
        .route("/scrape", post(scrape_handler))
        .route("/crawl", post(crawl_handler))
        .route("/map", post(map_handler))
        .route("/search", post(search_handler))
        .route("/extract", post(extract_handler))
        .route("/extract/job/:job_id", get(extract_job_handler))
        .layer(rate_limit_layer)
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
