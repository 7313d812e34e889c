use std::time::Instant;

use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::requests::{from_body, ExtractParams};
use crate::server::app::AppState;
use crate::server::envelope::{
    round2, ExecutionMetadata, ExtractEnvelope, ExtractJobEnvelope, ExtractionInfo, JobInfo,
    JobStatusEnvelope, SourceMetadata,
};
use crate::server::error::ApiError;
use crate::server::routes::require_url;
use crate::translate;

/// `POST /extract` - LLM extraction against one or more URLs.
///
/// By default the job is awaited inline and the extracted data comes
/// back in the response. With `enable_agent` the job can run long
/// enough that callers get the job handle instead and poll
/// `GET /extract/job/{id}` themselves.
pub async fn extract_handler(
    Extension(state): Extension<AppState>,
    body: Option<Json<Value>>,
) -> Result<Response, ApiError> {
    let started = Instant::now();

    let params: ExtractParams =
        from_body(body.map(|Json(v)| v)).map_err(ApiError::validation)?;

    let urls = match params.urls.clone().filter(|u| !u.is_empty()) {
        Some(urls) => urls
            .into_iter()
            .map(|u| require_url(Some(u)))
            .collect::<Result<Vec<_>, _>>()?,
        None => vec![require_url(params.url.clone())?],
    };
    let prompt = params
        .extract_prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("extract_prompt parameter is required"))?
        .to_string();

    let first_url = urls[0].clone();
    let request = translate::extract_request(urls, &prompt, &params);
    let parameters = serde_json::to_value(&request).unwrap_or(Value::Null);

    // Agent-backed jobs run too long to hold the connection open;
    // hand back the job handle for asynchronous polling.
    if params.enable_agent == Some(true) {
        let job = state
            .firecrawl
            .start_extract(&request)
            .await
            .map_err(|e| ApiError::upstream(e).with_elapsed(started.elapsed()))?;

        let elapsed = round2(started.elapsed().as_secs_f64());
        return Ok(Json(ExtractJobEnvelope {
            job_id: job.job_id,
            status: job.status.as_str().to_string(),
            expires_at: job.expires_at,
            job_info: JobInfo {
                url: first_url,
                prompt: request.prompt,
                execution_time_seconds: elapsed,
            },
            metadata: SourceMetadata::operation("extract"),
            execution_metadata: ExecutionMetadata::success(started),
        })
        .into_response());
    }

    let extracted = state
        .firecrawl
        .extract_and_wait(&request)
        .await
        .map_err(|e| ApiError::upstream(e).with_elapsed(started.elapsed()))?;

    let elapsed = round2(started.elapsed().as_secs_f64());
    Ok(Json(ExtractEnvelope {
        extracted_elements: extracted,
        extraction_info: ExtractionInfo {
            url: first_url,
            operation: "extract",
            parameters,
            execution_time_seconds: elapsed,
        },
        metadata: SourceMetadata::operation("extract"),
        execution_metadata: ExecutionMetadata::success(started),
    })
    .into_response())
}

/// `GET /extract/job/{id}` - current state of an extraction job.
pub async fn extract_job_handler(
    Extension(state): Extension<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusEnvelope>, ApiError> {
    let started = Instant::now();

    let status = state
        .firecrawl
        .extract_status(&job_id)
        .await
        .map_err(|e| ApiError::upstream(e).with_elapsed(started.elapsed()))?;

    Ok(Json(JobStatusEnvelope {
        job_id,
        status: status.status.as_str().to_string(),
        data: status.data,
        error: status.error,
        expires_at: status.expires_at,
        execution_metadata: ExecutionMetadata::success(started),
    }))
}
