use std::time::Instant;

use axum::{extract::Extension, Json};
use firecrawl_client::FirecrawlError;
use serde_json::Value;

use crate::requests::{from_body, MapParams};
use crate::server::app::AppState;
use crate::server::envelope::{
    round2, ExecutionMetadata, MapEnvelope, MapInfo, MapResults, SourceMetadata,
};
use crate::server::error::ApiError;
use crate::server::routes::require_url;
use crate::translate;

/// `POST /map` - discover a site's URLs without scraping content.
pub async fn map_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<MapEnvelope>, ApiError> {
    let started = Instant::now();

    let params: MapParams = from_body(body.map(|Json(v)| v)).map_err(ApiError::validation)?;
    let url = require_url(params.url.clone())?;

    // Content parameters hint that the caller wanted /scrape or /crawl.
    if params.extract_main_content.is_some() {
        tracing::debug!(%url, "content parameter sent to map endpoint, ignoring");
    }

    let request = translate::map_request(url.clone(), &params);
    let parameters = serde_json::to_value(&request).unwrap_or(Value::Null);

    let response = state.firecrawl.map(&request).await.map_err(|e| {
        let timed_out = matches!(&e, FirecrawlError::Api { status: 408, .. })
            || matches!(&e, FirecrawlError::Transport(source) if source.is_timeout());
        let mut error = ApiError::upstream(e).with_elapsed(started.elapsed());
        if timed_out {
            error = error.with_user_message(
                "The mapping operation timed out for this URL. Try a more specific \
                 URL, or disable include_subdomains to reduce the scope.",
            );
        }
        // The misdirected-parameter hint wins over the timeout hint.
        if params.extract_main_content.is_some() {
            error = error.with_user_message(
                "The map operation only discovers URLs. To retrieve page content, \
                 use the scrape or crawl operation instead.",
            );
        }
        error
    })?;

    if !response.success {
        return Err(ApiError::upstream_failure(
            "map request was not successful",
            None,
        )
        .with_elapsed(started.elapsed()));
    }

    let elapsed = round2(started.elapsed().as_secs_f64());
    Ok(Json(MapEnvelope {
        map_info: MapInfo {
            start_url: url,
            urls_found: response.links.len(),
            parameters,
            execution_time_seconds: elapsed,
        },
        map_results: MapResults {
            links: response.links,
        },
        metadata: SourceMetadata::operation("map"),
        execution_metadata: ExecutionMetadata::success(started),
    }))
}
