//! Crawl job polling and result aggregation.
//!
//! A submitted crawl job is observed (never written) by repeatedly
//! fetching its status URL until a terminal state or until the retry
//! and wall-clock budgets run out. Partial result pages are merged
//! append-only into an [`Aggregate`], so a failed fetch never loses
//! items that already arrived.
//!
//! The poller is an explicit state machine,
//! `Submitted -> Polling -> {Completed, Failed, Abandoned}`,
//! driven through the [`StatusSource`] seam so the transitions are
//! testable without HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backoff::{BackoffPolicy, Decision};
use crate::error::{FirecrawlError, Result};

/// Upstream job status as reported by status fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Scraping,
    Processing,
    Completed,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Terminal states end polling; everything else keeps the job alive.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Scraping => "scraping",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Unknown => "unknown",
        }
    }
}

/// Handle for an asynchronous job submitted upstream.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// Opaque identifier assigned by the upstream service.
    pub job_id: String,
    /// Absolute URL to poll for status and results.
    pub result_url: String,
}

/// One fetched batch of crawled items. Ephemeral; lives for a single
/// poll cycle before being merged.
#[derive(Debug, Clone)]
pub struct StatusPage {
    pub status: JobStatus,
    pub items: Vec<Value>,
    pub next_page_url: Option<String>,
}

/// Accumulated union of every page fetched during a job's lifetime.
/// Items only ever grow; ordering is fetch order.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub items: Vec<Value>,
    pub final_status: Option<JobStatus>,
}

impl Aggregate {
    /// Append a page's items in fetch order. No deduplication; an
    /// empty page is an identity operation.
    pub fn merge(&mut self, page: StatusPage) {
        self.items.extend(page.items);
    }
}

/// Where status fetches come from. Implemented by `FirecrawlClient`;
/// tests substitute a scripted source.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, url: &str) -> Result<StatusPage>;
}

/// Terminal result of polling one job.
///
/// `Abandoned` is not an error: it carries whatever accumulated before
/// the budgets ran out, plus the error that stopped the last fetch (if
/// any). Callers decide whether an empty abandoned aggregate counts as
/// a timeout failure.
#[derive(Debug)]
pub enum PollOutcome {
    Completed(Aggregate),
    Failed(Aggregate),
    Abandoned {
        aggregate: Aggregate,
        last_error: Option<FirecrawlError>,
    },
}

impl PollOutcome {
    pub fn aggregate(&self) -> &Aggregate {
        match self {
            PollOutcome::Completed(aggregate) | PollOutcome::Failed(aggregate) => aggregate,
            PollOutcome::Abandoned { aggregate, .. } => aggregate,
        }
    }
}

/// Drives one job from `Submitted` to a terminal outcome.
///
/// Transport failures and rate limits during a fetch are retried on
/// the transport schedule; the interval between successful status
/// fetches follows the polling schedule. The per-fetch retry counter
/// resets after every successful fetch, while the polling wall-clock
/// budget spans the whole job, so every call terminates.
pub struct JobPoller<'a, S: StatusSource + ?Sized> {
    source: &'a S,
    transport: BackoffPolicy,
    polling: BackoffPolicy,
}

impl<'a, S: StatusSource + ?Sized> JobPoller<'a, S> {
    pub fn new(source: &'a S, transport: BackoffPolicy, polling: BackoffPolicy) -> Self {
        Self {
            source,
            transport,
            polling,
        }
    }

    /// Poll `job` until a terminal status, a stop decision, or a
    /// non-retryable upstream error.
    pub async fn poll(&self, job: &CrawlJob) -> Result<PollOutcome> {
        let mut aggregate = Aggregate::default();
        // Waits summed across both schedules; bounds the whole job.
        let mut total_waited = Duration::ZERO;
        // Per-fetch transport retry state, reset on each success.
        let mut fetch_attempt: u32 = 0;
        let mut fetch_waited = Duration::ZERO;
        let mut poll_round: u32 = 0;

        loop {
            match self.source.fetch_status(&job.result_url).await {
                Ok(page) => {
                    fetch_attempt = 0;
                    fetch_waited = Duration::ZERO;
                    poll_round += 1;

                    let status = page.status;
                    let next_page_url = page.next_page_url.clone();
                    aggregate.merge(page);

                    if status.is_terminal() {
                        aggregate.final_status = Some(status);
                        tracing::info!(
                            job_id = %job.job_id,
                            status = status.as_str(),
                            items = aggregate.items.len(),
                            "job reached terminal status"
                        );
                        return Ok(match status {
                            JobStatus::Completed => PollOutcome::Completed(aggregate),
                            _ => PollOutcome::Failed(aggregate),
                        });
                    }

                    // Pagination within polling: one extra fetch against
                    // the advertised next page. Its failure loses nothing.
                    if let Some(next_url) = next_page_url {
                        match self.source.fetch_status(&next_url).await {
                            Ok(extra) => aggregate.merge(extra),
                            Err(error) => {
                                tracing::debug!(
                                    job_id = %job.job_id,
                                    %error,
                                    "next-page fetch failed, keeping accumulated items"
                                );
                            }
                        }
                    }

                    match self.polling.decide(poll_round, total_waited, None) {
                        Decision::Wait(delay) => {
                            tracing::debug!(
                                job_id = %job.job_id,
                                status = status.as_str(),
                                items = aggregate.items.len(),
                                round = poll_round,
                                "job in progress"
                            );
                            total_waited += delay;
                            tokio::time::sleep(delay).await;
                        }
                        Decision::Stop => {
                            tracing::warn!(
                                job_id = %job.job_id,
                                items = aggregate.items.len(),
                                rounds = poll_round,
                                "polling budget exhausted, abandoning job"
                            );
                            return Ok(PollOutcome::Abandoned {
                                aggregate,
                                last_error: None,
                            });
                        }
                    }
                }
                Err(error) if error.is_retryable() => {
                    fetch_attempt += 1;
                    let suggested = error.suggested_delay();
                    match self.transport.decide(fetch_attempt, fetch_waited, suggested) {
                        Decision::Wait(delay) => {
                            tracing::warn!(
                                job_id = %job.job_id,
                                attempt = fetch_attempt,
                                %error,
                                "status fetch failed, retrying"
                            );
                            fetch_waited += delay;
                            total_waited += delay;
                            tokio::time::sleep(delay).await;
                        }
                        Decision::Stop => {
                            return Ok(PollOutcome::Abandoned {
                                aggregate,
                                last_error: Some(error),
                            });
                        }
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted status source: pops responses front-to-back.
    struct Script {
        responses: Mutex<Vec<Result<StatusPage>>>,
        fetched_urls: Mutex<Vec<String>>,
    }

    impl Script {
        fn new(responses: Vec<Result<StatusPage>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                fetched_urls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StatusSource for Script {
        async fn fetch_status(&self, url: &str) -> Result<StatusPage> {
            self.fetched_urls.lock().unwrap().push(url.to_string());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                panic!("script exhausted");
            }
            responses.remove(0)
        }
    }

    fn page(status: JobStatus, count: usize) -> StatusPage {
        StatusPage {
            status,
            items: (0..count).map(|i| json!({ "page": i })).collect(),
            next_page_url: None,
        }
    }

    fn fast(max_attempts: u32) -> BackoffPolicy {
        BackoffPolicy {
            base_delay: Duration::from_millis(1),
            multiplier: 1.0,
            max_attempts,
            max_total_wait: Duration::from_secs(5),
        }
    }

    fn job() -> CrawlJob {
        CrawlJob {
            job_id: "job-1".into(),
            result_url: "https://api.example.test/crawl/job-1".into(),
        }
    }

    #[tokio::test]
    async fn accumulates_partial_pages_until_completed() {
        let script = Script::new(vec![
            Ok(page(JobStatus::Processing, 3)),
            Ok(page(JobStatus::Processing, 4)),
            Ok(page(JobStatus::Completed, 3)),
        ]);
        let poller = JobPoller::new(&script, fast(3), fast(10));

        let outcome = poller.poll(&job()).await.unwrap();
        match outcome {
            PollOutcome::Completed(aggregate) => {
                assert_eq!(aggregate.items.len(), 10);
                assert_eq!(aggregate.final_status, Some(JobStatus::Completed));
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn items_grow_monotonically() {
        let script = Script::new(vec![
            Ok(page(JobStatus::Scraping, 2)),
            Ok(page(JobStatus::Processing, 0)),
            Ok(page(JobStatus::Processing, 5)),
            Ok(page(JobStatus::Completed, 1)),
        ]);
        let poller = JobPoller::new(&script, fast(3), fast(10));

        let outcome = poller.poll(&job()).await.unwrap();
        // 2 + 0 + 5 + 1; the empty page removed nothing.
        assert_eq!(outcome.aggregate().items.len(), 8);
    }

    #[tokio::test]
    async fn failed_terminal_status_keeps_partial_items() {
        let script = Script::new(vec![
            Ok(page(JobStatus::Processing, 4)),
            Ok(page(JobStatus::Failed, 0)),
        ]);
        let poller = JobPoller::new(&script, fast(3), fast(10));

        match poller.poll(&job()).await.unwrap() {
            PollOutcome::Failed(aggregate) => {
                assert_eq!(aggregate.items.len(), 4);
                assert_eq!(aggregate.final_status, Some(JobStatus::Failed));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_errors_exhaust_into_abandoned() {
        fn transport_err() -> FirecrawlError {
            // A 408 is retryable like a transport failure and easy to build.
            FirecrawlError::Api {
                status: 408,
                message: "request timeout".into(),
            }
        }
        let script = Script::new(vec![
            Err(transport_err()),
            Err(transport_err()),
            Err(transport_err()),
            Err(transport_err()),
        ]);
        let poller = JobPoller::new(&script, fast(3), fast(10));

        match poller.poll(&job()).await.unwrap() {
            PollOutcome::Abandoned {
                aggregate,
                last_error,
            } => {
                assert!(aggregate.items.is_empty());
                assert!(matches!(
                    last_error,
                    Some(FirecrawlError::Api { status: 408, .. })
                ));
            }
            other => panic!("expected Abandoned, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn abandoned_after_polling_budget_keeps_items() {
        let script = Script::new(vec![
            Ok(page(JobStatus::Processing, 2)),
            Ok(page(JobStatus::Processing, 2)),
            Ok(page(JobStatus::Processing, 2)),
        ]);
        // Polling schedule allows only two waits.
        let poller = JobPoller::new(&script, fast(3), fast(2));

        match poller.poll(&job()).await.unwrap() {
            PollOutcome::Abandoned {
                aggregate,
                last_error,
            } => {
                assert_eq!(aggregate.items.len(), 6);
                assert!(last_error.is_none());
            }
            other => panic!("expected Abandoned, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn retry_counter_resets_after_successful_fetch() {
        fn rate_limited() -> FirecrawlError {
            FirecrawlError::RateLimited { retry_after: None }
        }
        // Two failures before each of two successful fetches; a shared
        // counter would exceed max_attempts=2, a per-fetch one does not.
        let script = Script::new(vec![
            Err(rate_limited()),
            Err(rate_limited()),
            Ok(page(JobStatus::Processing, 1)),
            Err(rate_limited()),
            Err(rate_limited()),
            Ok(page(JobStatus::Completed, 1)),
        ]);
        let poller = JobPoller::new(&script, fast(2), fast(10));

        match poller.poll(&job()).await.unwrap() {
            PollOutcome::Completed(aggregate) => assert_eq!(aggregate.items.len(), 2),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn follows_next_page_url_within_a_poll_cycle() {
        let mut first = page(JobStatus::Processing, 3);
        first.next_page_url = Some("https://api.example.test/crawl/job-1?skip=3".into());
        let script = Script::new(vec![
            Ok(first),
            Ok(page(JobStatus::Processing, 2)),
            Ok(page(JobStatus::Completed, 0)),
        ]);
        let poller = JobPoller::new(&script, fast(3), fast(10));

        let outcome = poller.poll(&job()).await.unwrap();
        assert_eq!(outcome.aggregate().items.len(), 5);
        let urls = script.fetched_urls.lock().unwrap();
        assert_eq!(urls[1], "https://api.example.test/crawl/job-1?skip=3");
    }

    #[tokio::test]
    async fn failed_next_page_fetch_loses_nothing() {
        let mut first = page(JobStatus::Processing, 3);
        first.next_page_url = Some("https://api.example.test/crawl/job-1?skip=3".into());
        let script = Script::new(vec![
            Ok(first),
            Err(FirecrawlError::InvalidResponse("truncated body".into())),
            Ok(page(JobStatus::Completed, 1)),
        ]);
        let poller = JobPoller::new(&script, fast(3), fast(10));

        let outcome = poller.poll(&job()).await.unwrap();
        assert_eq!(outcome.aggregate().items.len(), 4);
    }

    #[tokio::test]
    async fn non_retryable_error_propagates() {
        let script = Script::new(vec![Err(FirecrawlError::Api {
            status: 403,
            message: "forbidden".into(),
        })]);
        let poller = JobPoller::new(&script, fast(3), fast(10));

        let err = poller.poll(&job()).await.unwrap_err();
        assert!(matches!(err, FirecrawlError::Api { status: 403, .. }));
    }

    #[test]
    fn merge_with_empty_page_is_identity() {
        let mut aggregate = Aggregate::default();
        aggregate.merge(page(JobStatus::Processing, 3));
        let before = aggregate.items.clone();

        aggregate.merge(page(JobStatus::Processing, 0));
        assert_eq!(aggregate.items, before);
    }

    #[test]
    fn job_status_parses_vendor_strings() {
        let status: JobStatus = serde_json::from_str("\"scraping\"").unwrap();
        assert_eq!(status, JobStatus::Scraping);
        let status: JobStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, JobStatus::Unknown);
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }
}
