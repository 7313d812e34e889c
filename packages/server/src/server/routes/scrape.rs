use std::time::Instant;

use axum::{extract::Extension, Json};
use serde_json::Value;

use crate::requests::{from_body, ScrapeParams};
use crate::server::app::AppState;
use crate::server::envelope::{
    round2, ExecutionMetadata, ExtractionInfo, ScrapeEnvelope, SourceMetadata,
};
use crate::server::error::ApiError;
use crate::server::routes::require_url;
use crate::translate;

/// `POST /scrape` - fetch a single page through the upstream scraper.
pub async fn scrape_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<ScrapeEnvelope>, ApiError> {
    let started = Instant::now();

    let params: ScrapeParams =
        from_body(body.map(|Json(v)| v)).map_err(ApiError::validation)?;
    let url = require_url(params.url.clone())?;

    if params.stealth_mode == Some(true) {
        tracing::warn!(%url, "stealth_mode requested but not supported, ignoring");
    }

    let request = translate::scrape_request(url.clone(), &params);
    let parameters = serde_json::to_value(&request).unwrap_or(Value::Null);

    let result = state
        .firecrawl
        .scrape(&request)
        .await
        .map_err(|e| ApiError::upstream(e).with_elapsed(started.elapsed()))?;

    let elapsed = round2(started.elapsed().as_secs_f64());
    Ok(Json(ScrapeEnvelope {
        result,
        extraction_info: ExtractionInfo {
            url,
            operation: "scrape",
            parameters,
            execution_time_seconds: elapsed,
        },
        metadata: SourceMetadata::operation("scrape"),
        execution_metadata: ExecutionMetadata::success(started),
    }))
}
