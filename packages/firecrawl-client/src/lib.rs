//! Pure Firecrawl REST API client.
//!
//! A minimal client for the Firecrawl v1 API. Supports single-page
//! scrapes, asynchronous crawl jobs with polling and result
//! aggregation, sitemap-style URL mapping, web search, and LLM
//! extraction jobs.
//!
//! # Example
//!
//! ```rust,ignore
//! use firecrawl_client::{CrawlRequest, FirecrawlClient, PollOutcome};
//!
//! let client = FirecrawlClient::new(api_key)?;
//! let request = CrawlRequest { url: "https://example.com".into(), limit: 10, ..Default::default() };
//! match client.crawl_and_wait(&request).await? {
//!     PollOutcome::Completed(aggregate) => println!("{} pages", aggregate.items.len()),
//!     other => println!("crawl ended early: {other:?}"),
//! }
//! ```

pub mod backoff;
pub mod error;
pub mod poller;
pub mod types;

pub use backoff::{parse_retry_after, BackoffPolicy, Decision, RetryState};
pub use error::{FirecrawlError, Result};
pub use poller::{
    Aggregate, CrawlJob, JobPoller, JobStatus, PollOutcome, StatusPage, StatusSource,
};
pub use types::{
    AgentConfig, CrawlRequest, CrawlStartResponse, CrawlStatusResponse, ExtractJob,
    ExtractRequest, ExtractStartResponse, ExtractStatusResponse, MapRequest, MapResponse,
    ScrapeOptions, ScrapeRequest, SearchHit, SearchRequest, SearchResponse,
};

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev/v1";

/// Client for the Firecrawl v1 API.
///
/// Individual request helpers never retry; the retry and polling
/// schedules are applied by the higher-level operations
/// ([`map`](Self::map), [`crawl_and_wait`](Self::crawl_and_wait),
/// [`extract_and_wait`](Self::extract_and_wait)).
pub struct FirecrawlClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    transport: BackoffPolicy,
    polling: BackoffPolicy,
}

impl FirecrawlClient {
    /// Create a client with default backoff schedules and a 120s
    /// request timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(FirecrawlError::Transport)?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: BackoffPolicy::transport(),
            polling: BackoffPolicy::polling(),
        })
    }

    /// Point the client at a different API host (tests, staging).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Replace the transport-retry schedule.
    pub fn with_transport_policy(mut self, policy: BackoffPolicy) -> Self {
        self.transport = policy;
        self
    }

    /// Replace the status-polling schedule.
    pub fn with_polling_policy(mut self, policy: BackoffPolicy) -> Self {
        self.polling = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(FirecrawlError::Transport)?;
        Self::read_json(response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(FirecrawlError::Transport)?;
        Self::read_json(response).await
    }

    async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            return Err(FirecrawlError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FirecrawlError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| FirecrawlError::InvalidResponse(e.to_string()))
    }

    /// POST with the transport-retry schedule applied. Returns the last
    /// error once the schedule says stop.
    async fn post_with_retry<T, R>(&self, path: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut state = RetryState::new();
        loop {
            match self.post_json(path, body).await {
                Ok(response) => return Ok(response),
                Err(error) if error.is_retryable() => {
                    let suggested = error.suggested_delay();
                    match state.next_delay(&self.transport, suggested) {
                        Decision::Wait(delay) => {
                            tracing::warn!(
                                path,
                                attempt = state.attempts(),
                                %error,
                                "request failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        Decision::Stop => return Err(error),
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Scrape a single URL. Returns the provider's response body as-is.
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<Value> {
        self.post_json("/scrape", request).await
    }

    /// Submit an asynchronous crawl job. Returns immediately with the
    /// job handle.
    pub async fn start_crawl(&self, request: &CrawlRequest) -> Result<CrawlJob> {
        let response: CrawlStartResponse = self.post_json("/crawl", request).await?;
        if !response.success {
            return Err(FirecrawlError::InvalidResponse(
                "crawl submission rejected".into(),
            ));
        }
        let id = response
            .id
            .ok_or_else(|| FirecrawlError::InvalidResponse("no crawl id returned".into()))?;
        let result_url = self.endpoint(&format!("/crawl/{id}"));
        Ok(CrawlJob {
            job_id: id,
            result_url,
        })
    }

    /// Crawl end-to-end: submit the job, poll until a terminal status
    /// or the budgets run out, return the aggregated result.
    pub async fn crawl_and_wait(&self, request: &CrawlRequest) -> Result<PollOutcome> {
        let job = self.start_crawl(request).await?;
        tracing::info!(job_id = %job.job_id, url = %request.url, "crawl job started, polling for results");
        JobPoller::new(self, self.transport, self.polling)
            .poll(&job)
            .await
    }

    /// Map a site's URLs. Retried on transport failures, 408s, and
    /// rate limits.
    pub async fn map(&self, request: &MapRequest) -> Result<MapResponse> {
        self.post_with_retry("/map", request).await
    }

    /// Web search, optionally scraping each hit.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.post_json("/search", request).await
    }

    /// Submit an LLM extraction job. Returns immediately with the job
    /// handle.
    pub async fn start_extract(&self, request: &ExtractRequest) -> Result<ExtractJob> {
        let response: ExtractStartResponse = self.post_json("/extract", request).await?;
        let id = response
            .id
            .ok_or_else(|| FirecrawlError::InvalidResponse("no extract job id returned".into()))?;
        Ok(ExtractJob {
            job_id: id,
            status: response.status.unwrap_or(JobStatus::Unknown),
            expires_at: response.expires_at,
        })
    }

    /// Fetch the current status of an extraction job.
    pub async fn extract_status(&self, job_id: &str) -> Result<ExtractStatusResponse> {
        self.get_json(&self.endpoint(&format!("/extract/{job_id}")))
            .await
    }

    /// Poll an extraction job until it completes; returns the extracted
    /// data. Unlike crawls, extraction carries no partial results, so
    /// budget exhaustion is an error rather than a degraded success.
    pub async fn wait_for_extract(&self, job_id: &str) -> Result<Value> {
        let mut poll_round: u32 = 0;
        let mut total_waited = Duration::ZERO;
        let mut fetch_state = RetryState::new();

        loop {
            match self.extract_status(job_id).await {
                Ok(status) => {
                    fetch_state = RetryState::new();
                    poll_round += 1;
                    match status.status {
                        JobStatus::Completed => {
                            return Ok(status.data.unwrap_or(Value::Null));
                        }
                        JobStatus::Failed => {
                            return Err(FirecrawlError::JobFailed(
                                status.error.unwrap_or_else(|| "no detail provided".into()),
                            ));
                        }
                        other => {
                            tracing::debug!(job_id, status = other.as_str(), round = poll_round, "extraction in progress");
                            match self.polling.decide(poll_round, total_waited, None) {
                                Decision::Wait(delay) => {
                                    total_waited += delay;
                                    tokio::time::sleep(delay).await;
                                }
                                Decision::Stop => {
                                    return Err(FirecrawlError::BudgetExhausted {
                                        attempts: poll_round,
                                    })
                                }
                            }
                        }
                    }
                }
                Err(error) if error.is_retryable() => {
                    let suggested = error.suggested_delay();
                    match fetch_state.next_delay(&self.transport, suggested) {
                        Decision::Wait(delay) => {
                            tracing::warn!(job_id, %error, "extract status fetch failed, retrying");
                            total_waited += delay;
                            tokio::time::sleep(delay).await;
                        }
                        Decision::Stop => return Err(error),
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Extract end-to-end: submit the job and poll it to completion.
    pub async fn extract_and_wait(&self, request: &ExtractRequest) -> Result<Value> {
        let job = self.start_extract(request).await?;
        tracing::info!(job_id = %job.job_id, "extraction job started, polling for completion");
        self.wait_for_extract(&job.job_id).await
    }
}

#[async_trait]
impl StatusSource for FirecrawlClient {
    async fn fetch_status(&self, url: &str) -> Result<StatusPage> {
        let response: CrawlStatusResponse = self.get_json(url).await?;
        tracing::debug!(
            status = response.status.as_str(),
            completed = ?response.completed,
            total = ?response.total,
            "crawl status fetched"
        );
        Ok(StatusPage {
            status: response.status,
            items: response.data.unwrap_or_default(),
            next_page_url: response.next,
        })
    }
}
