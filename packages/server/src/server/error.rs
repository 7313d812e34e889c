//! Error-to-response mapping for the connector surface.
//!
//! Validation failures are 400 and never touch the upstream; rate
//! limits that survived the retry budget are 429; everything else is
//! 500 with whatever diagnostic payload the upstream provided. Every
//! failure body still carries `execution_metadata`, never a bare
//! backtrace.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use firecrawl_client::FirecrawlError;
use serde_json::{json, Value};

use super::envelope::ExecutionMetadata;

#[derive(Debug)]
enum ApiErrorKind {
    Validation(String),
    RateLimited(String),
    Timeout(String),
    Upstream { message: String, details: Option<Value> },
    Internal(String),
}

#[derive(Debug)]
pub struct ApiError {
    kind: ApiErrorKind,
    user_message: Option<String>,
    elapsed: Duration,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Validation(message.into()),
            user_message: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Timeout(message.into()),
            user_message: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn upstream_failure(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            kind: ApiErrorKind::Upstream {
                message: message.into(),
                details,
            },
            user_message: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Map a client-library error onto the connector taxonomy.
    pub fn upstream(error: FirecrawlError) -> Self {
        let kind = match error {
            FirecrawlError::RateLimited { .. } => ApiErrorKind::RateLimited(
                "upstream rate limit was not resolved within the retry budget".into(),
            ),
            FirecrawlError::BudgetExhausted { attempts } => ApiErrorKind::Timeout(format!(
                "no terminal job status after {attempts} status polls"
            )),
            FirecrawlError::Api { status, message } => {
                let details: Option<Value> = serde_json::from_str(&message).ok();
                let summary = details
                    .as_ref()
                    .and_then(|d| d.get("error"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or(message);
                ApiErrorKind::Upstream {
                    message: format!("Firecrawl API error {status}: {summary}"),
                    details,
                }
            }
            FirecrawlError::JobFailed(detail) => ApiErrorKind::Upstream {
                message: format!("upstream job failed: {detail}"),
                details: None,
            },
            FirecrawlError::Transport(source) => {
                ApiErrorKind::Internal(format!("transport error: {source}"))
            }
            FirecrawlError::InvalidResponse(detail) => {
                ApiErrorKind::Internal(format!("malformed upstream response: {detail}"))
            }
        };
        Self {
            kind,
            user_message: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self.kind {
            ApiErrorKind::Validation(m) => (StatusCode::BAD_REQUEST, m, None),
            ApiErrorKind::RateLimited(m) => (StatusCode::TOO_MANY_REQUESTS, m, None),
            ApiErrorKind::Timeout(m) => (StatusCode::INTERNAL_SERVER_ERROR, m, None),
            ApiErrorKind::Upstream { message, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
            ApiErrorKind::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m, None),
        };

        tracing::warn!(status = %status, error = %message, "request failed");

        let mut body = json!({
            "error": message,
            "execution_metadata": ExecutionMetadata::failure(self.elapsed.as_secs_f64()),
        });
        if let Some(details) = details {
            body["details"] = details;
        }
        if let Some(user_message) = self.user_message {
            body["user_message"] = Value::String(user_message);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: ApiError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            status_of(ApiError::validation("URL is required")),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let error = ApiError::upstream(FirecrawlError::RateLimited { retry_after: None });
        assert_eq!(status_of(error), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn upstream_and_timeout_map_to_500() {
        let error = ApiError::upstream(FirecrawlError::Api {
            status: 502,
            message: "bad gateway".into(),
        });
        assert_eq!(status_of(error), StatusCode::INTERNAL_SERVER_ERROR);

        let error = ApiError::upstream(FirecrawlError::BudgetExhausted { attempts: 12 });
        assert_eq!(status_of(error), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_error_field_is_extracted_from_json_bodies() {
        let error = ApiError::upstream(FirecrawlError::Api {
            status: 402,
            message: r#"{"error": "insufficient credits"}"#.into(),
        });
        match error.kind {
            ApiErrorKind::Upstream { message, details } => {
                assert!(message.contains("insufficient credits"));
                assert!(details.is_some());
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }
}
