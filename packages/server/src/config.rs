use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use firecrawl_client::BackoffPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub firecrawl_api_key: String,
    pub firecrawl_base_url: String,
    /// Transport-retry schedule (connection failures, 408s, 429s).
    pub retry_base_delay_ms: u64,
    pub retry_multiplier: f64,
    pub retry_max_attempts: u32,
    pub retry_max_total_wait_secs: u64,
    /// Status-polling schedule for asynchronous jobs.
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
    pub poll_max_total_wait_secs: u64,
}

fn var_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a valid number")),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables. Only the API key
    /// is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: var_or("PORT", 8080)?,
            firecrawl_api_key: env::var("FIRECRAWL_API_KEY")
                .context("FIRECRAWL_API_KEY must be set")?,
            firecrawl_base_url: env::var("FIRECRAWL_BASE_URL")
                .unwrap_or_else(|_| "https://api.firecrawl.dev/v1".to_string()),
            retry_base_delay_ms: var_or("RETRY_BASE_DELAY_MS", 2000)?,
            retry_multiplier: var_or("RETRY_MULTIPLIER", 2.0)?,
            retry_max_attempts: var_or("RETRY_MAX_ATTEMPTS", 3)?,
            retry_max_total_wait_secs: var_or("RETRY_MAX_TOTAL_WAIT_SECS", 60)?,
            poll_interval_secs: var_or("POLL_INTERVAL_SECS", 5)?,
            poll_max_attempts: var_or("POLL_MAX_ATTEMPTS", 60)?,
            poll_max_total_wait_secs: var_or("POLL_MAX_TOTAL_WAIT_SECS", 300)?,
        })
    }

    pub fn transport_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            multiplier: self.retry_multiplier,
            max_attempts: self.retry_max_attempts,
            max_total_wait: Duration::from_secs(self.retry_max_total_wait_secs),
        }
    }

    pub fn polling_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            base_delay: Duration::from_secs(self.poll_interval_secs),
            multiplier: 1.0,
            max_attempts: self.poll_max_attempts,
            max_total_wait: Duration::from_secs(self.poll_max_total_wait_secs),
        }
    }
}
