use std::time::Instant;

use axum::{extract::Extension, Json};
use serde_json::Value;

use crate::requests::{from_body, SearchParams};
use crate::server::app::AppState;
use crate::server::envelope::{
    round2, ExecutionMetadata, SearchEnvelope, SearchInfo, SearchItem, SourceMetadata,
};
use crate::server::error::ApiError;
use crate::translate;

/// `POST /search` - web search, optionally scraping each hit.
pub async fn search_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<SearchEnvelope>, ApiError> {
    let started = Instant::now();

    let params: SearchParams =
        from_body(body.map(|Json(v)| v)).map_err(ApiError::validation)?;
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::validation("query parameter is required"))?;

    let request = translate::search_request(query.clone(), &params);
    let parameters = serde_json::to_value(&request).unwrap_or(Value::Null);

    let response = state
        .firecrawl
        .search(&request)
        .await
        .map_err(|e| ApiError::upstream(e).with_elapsed(started.elapsed()))?;

    let result: Vec<SearchItem> = response
        .data
        .into_iter()
        .map(|hit| SearchItem {
            url: hit.url,
            title: hit.title,
            snippet: hit.description,
            content: hit.markdown,
        })
        .collect();

    let elapsed = round2(started.elapsed().as_secs_f64());
    Ok(Json(SearchEnvelope {
        search_info: SearchInfo {
            query,
            results_count: result.len(),
            parameters,
            execution_time_seconds: elapsed,
        },
        result,
        metadata: SourceMetadata::operation("search"),
        execution_metadata: ExecutionMetadata::success(started),
    }))
}
