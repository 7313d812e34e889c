use std::time::Instant;

use axum::{extract::Extension, Json};
use firecrawl_client::PollOutcome;
use serde_json::Value;

use crate::requests::{from_body, CrawlParams};
use crate::server::app::AppState;
use crate::server::envelope::{
    round2, CrawlEnvelope, CrawlInfo, ExecutionMetadata, SourceMetadata,
};
use crate::server::error::ApiError;
use crate::server::routes::require_url;
use crate::translate;

/// `POST /crawl` - submit a crawl job, poll it to completion, and
/// return the aggregated pages.
///
/// A job that ran out of polling budget with partial results is still
/// a success, marked `degraded`; one that produced nothing at all is a
/// failure (429 when the rate limiter was the reason, timeout
/// otherwise).
pub async fn crawl_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<CrawlEnvelope>, ApiError> {
    let started = Instant::now();

    let params: CrawlParams =
        from_body(body.map(|Json(v)| v)).map_err(ApiError::validation)?;
    let url = require_url(params.url.clone())?;

    if params.stealth_mode == Some(true) {
        tracing::warn!(%url, "stealth_mode requested but not supported, ignoring");
    }

    let request = translate::crawl_request(url.clone(), &params);
    let parameters = serde_json::to_value(&request).unwrap_or(Value::Null);

    let outcome = state
        .firecrawl
        .crawl_and_wait(&request)
        .await
        .map_err(|e| ApiError::upstream(e).with_elapsed(started.elapsed()))?;

    let (aggregate, final_status, degraded) = match outcome {
        PollOutcome::Completed(aggregate) => (aggregate, "completed".to_string(), false),
        PollOutcome::Failed(aggregate) => {
            return Err(ApiError::upstream_failure(
                format!(
                    "crawl job ended in failed state after {} pages",
                    aggregate.items.len()
                ),
                None,
            )
            .with_elapsed(started.elapsed()));
        }
        PollOutcome::Abandoned {
            aggregate,
            last_error,
        } => {
            if aggregate.items.is_empty() {
                // A rate-limited last fetch surfaces as 429; anything
                // else is a timeout or the upstream error itself.
                let error = match last_error {
                    Some(err) => ApiError::upstream(err),
                    None => ApiError::timeout(
                        "crawl did not reach a terminal status within the polling budget",
                    ),
                };
                return Err(error.with_elapsed(started.elapsed()));
            }
            tracing::warn!(
                %url,
                pages = aggregate.items.len(),
                "returning partial crawl results"
            );
            (aggregate, "timeout".to_string(), true)
        }
    };

    let elapsed = round2(started.elapsed().as_secs_f64());
    Ok(Json(CrawlEnvelope {
        crawl_info: CrawlInfo {
            start_url: url,
            pages_crawled: aggregate.items.len(),
            final_status,
            degraded,
            crawler_parameters: parameters,
            execution_time_seconds: elapsed,
        },
        crawl_results: aggregate.items,
        metadata: SourceMetadata::operation("crawl"),
        execution_metadata: ExecutionMetadata::success(started),
    }))
}
