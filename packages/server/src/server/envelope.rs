//! Connector response envelopes.
//!
//! Every endpoint, success or failure, reports
//! `execution_metadata: {execution_time_seconds, success}`; each
//! operation adds its own `*_info` block echoing what was asked of the
//! upstream.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Round to two decimals, the precision the connector has always
/// reported.
pub fn round2(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    pub execution_time_seconds: f64,
    pub success: bool,
}

impl ExecutionMetadata {
    pub fn success(started: Instant) -> Self {
        Self {
            execution_time_seconds: round2(started.elapsed().as_secs_f64()),
            success: true,
        }
    }

    pub fn failure(elapsed_seconds: f64) -> Self {
        Self {
            execution_time_seconds: round2(elapsed_seconds),
            success: false,
        }
    }
}

/// Provenance block attached to success envelopes.
#[derive(Debug, Serialize)]
pub struct SourceMetadata {
    pub source: &'static str,
    pub operation: &'static str,
}

impl SourceMetadata {
    pub fn operation(operation: &'static str) -> Self {
        Self {
            source: "Firecrawl API",
            operation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractionInfo {
    pub url: String,
    #[serde(rename = "type")]
    pub operation: &'static str,
    /// Vendor payload echo, for callers debugging their field mapping.
    pub parameters: Value,
    pub execution_time_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct ScrapeEnvelope {
    pub result: Value,
    pub extraction_info: ExtractionInfo,
    pub metadata: SourceMetadata,
    pub execution_metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct CrawlInfo {
    pub start_url: String,
    pub pages_crawled: usize,
    pub final_status: String,
    /// Set when the poll budget ran out and a partial result is being
    /// returned.
    #[serde(skip_serializing_if = "is_false")]
    pub degraded: bool,
    pub crawler_parameters: Value,
    pub execution_time_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct CrawlEnvelope {
    pub crawl_results: Vec<Value>,
    pub crawl_info: CrawlInfo,
    pub metadata: SourceMetadata,
    pub execution_metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct MapResults {
    pub links: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MapInfo {
    pub start_url: String,
    pub urls_found: usize,
    pub parameters: Value,
    pub execution_time_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct MapEnvelope {
    pub map_results: MapResults,
    pub map_info: MapInfo,
    pub metadata: SourceMetadata,
    pub execution_metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct SearchItem {
    pub url: String,
    pub title: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchInfo {
    pub query: String,
    pub results_count: usize,
    pub parameters: Value,
    pub execution_time_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct SearchEnvelope {
    pub result: Vec<SearchItem>,
    pub search_info: SearchInfo,
    pub metadata: SourceMetadata,
    pub execution_metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct ExtractEnvelope {
    pub extracted_elements: Value,
    pub extraction_info: ExtractionInfo,
    pub metadata: SourceMetadata,
    pub execution_metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct JobInfo {
    pub url: String,
    pub prompt: String,
    pub execution_time_seconds: f64,
}

/// Returned when an extraction job is handed back for asynchronous
/// polling instead of being awaited inline.
#[derive(Debug, Serialize)]
pub struct ExtractJobEnvelope {
    pub job_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub job_info: JobInfo,
    pub metadata: SourceMetadata,
    pub execution_metadata: ExecutionMetadata,
}

/// `GET /extract/job/{id}` passthrough of the upstream job state.
#[derive(Debug, Serialize)]
pub struct JobStatusEnvelope {
    pub job_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub execution_metadata: ExecutionMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(12.0), 12.0);
    }

    #[test]
    fn degraded_flag_is_omitted_when_false() {
        let info = CrawlInfo {
            start_url: "https://example.com".into(),
            pages_crawled: 3,
            final_status: "completed".into(),
            degraded: false,
            crawler_parameters: Value::Null,
            execution_time_seconds: 0.5,
        };
        let value = serde_json::to_value(&info).unwrap();
        assert!(value.get("degraded").is_none());
    }
}
