//! Typed errors for the Firecrawl client.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to keep the
//! retry machinery able to match on failure classes.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the Firecrawl API.
#[derive(Debug, Error)]
pub enum FirecrawlError {
    /// Connection failure or request timeout. Distinct from a non-2xx
    /// HTTP status, which is reported as `Api`.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Upstream returned HTTP 429. Carries the parsed `Retry-After`
    /// delay when the header was present and numeric.
    #[error("rate limited by upstream")]
    RateLimited { retry_after: Option<Duration> },

    /// Upstream returned a non-2xx, non-429 status.
    #[error("Firecrawl API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Upstream reported a job as failed.
    #[error("upstream job failed: {0}")]
    JobFailed(String),

    /// Response body could not be parsed or was missing required fields.
    #[error("malformed upstream response: {0}")]
    InvalidResponse(String),

    /// Retry or polling limits were reached without a terminal state.
    #[error("budget exhausted after {attempts} attempts")]
    BudgetExhausted { attempts: u32 },
}

impl FirecrawlError {
    /// Whether the retry machinery may re-attempt after this error.
    /// Transport failures, rate limits, and upstream request timeouts
    /// (HTTP 408) qualify; everything else propagates immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FirecrawlError::Transport(_)
                | FirecrawlError::RateLimited { .. }
                | FirecrawlError::Api { status: 408, .. }
        )
    }

    /// Server-suggested delay before the next attempt, if the upstream
    /// provided one.
    pub fn suggested_delay(&self) -> Option<Duration> {
        match self {
            FirecrawlError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, FirecrawlError>;
