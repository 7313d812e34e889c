//! Request and response types for the Firecrawl v1 API.
//!
//! Field names follow the vendor's camelCase wire schema; connector
//! code builds these from its own snake_case parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::poller::JobStatus;

/// Options nested under `scrapeOptions` on crawl and search requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_main_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ScrapeOptions {
    /// True when no field is set; an empty object is omitted from the
    /// payload entirely.
    pub fn is_empty(&self) -> bool {
        *self == ScrapeOptions::default()
    }
}

/// `POST /scrape` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_only_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_main_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// `POST /crawl` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub url: String,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_external_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_backward_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_options: Option<ScrapeOptions>,
}

/// `POST /crawl` submission acknowledgement.
#[derive(Debug, Deserialize)]
pub struct CrawlStartResponse {
    #[serde(default)]
    pub success: bool,
    pub id: Option<String>,
}

/// One `GET /crawl/{id}` status fetch.
#[derive(Debug, Deserialize)]
pub struct CrawlStatusResponse {
    #[serde(default)]
    pub status: JobStatus,
    pub completed: Option<u64>,
    pub total: Option<u64>,
    /// URL of the next result batch when one status fetch cannot carry
    /// everything.
    pub next: Option<String>,
    pub data: Option<Vec<Value>>,
}

/// `POST /map` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_subdomains: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_sitemap: Option<bool>,
}

/// `POST /map` response.
#[derive(Debug, Deserialize)]
pub struct MapResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub links: Vec<String>,
}

/// `POST /search` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tbs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_options: Option<ScrapeOptions>,
}

/// One search result from `POST /search`. `markdown` is present only
/// when the search was asked to scrape its hits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub description: String,
    pub markdown: Option<String>,
}

/// `POST /search` response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<SearchHit>,
}

/// Agent configuration for LLM extraction jobs.
#[derive(Debug, Clone, Serialize)]
pub struct AgentConfig {
    pub model: String,
}

impl AgentConfig {
    pub fn fire_1() -> Self {
        Self {
            model: "FIRE-1".to_string(),
        }
    }
}

/// `POST /extract` request body. The vendor takes the extraction
/// instruction under `auxiliarPrompt` (sic).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub urls: Vec<String>,
    #[serde(rename = "auxiliarPrompt")]
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentConfig>,
    pub enable_web_search: bool,
}

/// `POST /extract` submission acknowledgement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractStartResponse {
    #[serde(default)]
    pub success: bool,
    pub id: Option<String>,
    pub status: Option<JobStatus>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Handle for a submitted extraction job.
#[derive(Debug, Clone)]
pub struct ExtractJob {
    pub job_id: String,
    pub status: JobStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

/// One `GET /extract/{id}` status fetch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractStatusResponse {
    #[serde(default)]
    pub status: JobStatus,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}
