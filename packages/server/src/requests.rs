//! Public request parameters for the connector endpoints.
//!
//! The connector historically accepted loosely-typed form data:
//! snake_case field names next to camelCase aliases, booleans as
//! strings, comma-separated strings where arrays were meant, and the
//! whole body optionally nested under a `data` key. These types absorb
//! all of that so the translator works on clean values.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Unwrap the workflow-runtime envelope (one level of `{"data": {...}}`)
/// and deserialize the connector parameters. A missing body is treated
/// as empty so required-field checks produce the proper message.
pub fn from_body<T: DeserializeOwned + Default>(body: Option<Value>) -> Result<T, String> {
    let mut value = body.unwrap_or(Value::Null);
    let nested = value.get("data").filter(|v| v.is_object()).cloned();
    if let Some(inner) = nested {
        value = inner;
    }
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| format!("malformed request body: {e}"))
}

/// A field that arrives either as one string (possibly comma-separated)
/// or as a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    /// Normalize into a trimmed, non-empty tag list.
    pub fn to_tags(&self) -> Vec<String> {
        match self {
            StringOrList::One(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            StringOrList::Many(items) => items
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Accept `true`/`false`, `"true"`/`"True"`/`"1"` and friends, or
/// numbers. Anything unrecognized is treated as absent.
pub fn flexible_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(coerce_bool))
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim() {
            "true" | "True" | "1" => Some(true),
            "false" | "False" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Accept an integer or a numeric string. Anything unparseable is
/// treated as absent rather than failing the request.
pub fn flexible_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(coerce_u64))
}

fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `POST /scrape` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScrapeParams {
    pub url: Option<String>,
    pub formats: Option<Vec<String>>,
    #[serde(alias = "excludeTags", alias = "excludeSections")]
    pub exclude_tags: Option<StringOrList>,
    #[serde(alias = "includeOnlyTags")]
    pub include_only_tags: Option<StringOrList>,
    #[serde(alias = "waitFor", alias = "waitMs", deserialize_with = "flexible_u64")]
    pub wait_for: Option<u64>,
    #[serde(alias = "timeoutMs", deserialize_with = "flexible_u64")]
    pub timeout: Option<u64>,
    #[serde(
        alias = "onlyMainContent",
        alias = "extractMainContent",
        deserialize_with = "flexible_bool"
    )]
    pub extract_main_content: Option<bool>,
    #[serde(alias = "stealthMode", deserialize_with = "flexible_bool")]
    pub stealth_mode: Option<bool>,
}

/// `POST /crawl` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CrawlParams {
    pub url: Option<String>,
    #[serde(alias = "maxPages", deserialize_with = "flexible_u64")]
    pub max_pages: Option<u64>,
    #[serde(alias = "stayOnDomain", deserialize_with = "flexible_bool")]
    pub stay_on_domain: Option<bool>,
    #[serde(alias = "followLinks", deserialize_with = "flexible_bool")]
    pub follow_links: Option<bool>,
    #[serde(
        alias = "onlyMainContent",
        alias = "extractMainContent",
        deserialize_with = "flexible_bool"
    )]
    pub extract_main_content: Option<bool>,
    #[serde(alias = "includeOnlyUrls")]
    pub include_only_urls: Option<Vec<String>>,
    #[serde(alias = "excludeUrls")]
    pub exclude_urls: Option<Vec<String>>,
    #[serde(alias = "includeOnlyTags")]
    pub include_only_tags: Option<StringOrList>,
    #[serde(alias = "excludeTags")]
    pub exclude_tags: Option<StringOrList>,
    #[serde(alias = "waitFor", deserialize_with = "flexible_u64")]
    pub wait_for: Option<u64>,
    #[serde(deserialize_with = "flexible_u64")]
    pub timeout: Option<u64>,
    #[serde(alias = "stealthMode", deserialize_with = "flexible_bool")]
    pub stealth_mode: Option<bool>,
}

/// `POST /search` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub query: Option<String>,
    #[serde(deserialize_with = "flexible_u64")]
    pub limit: Option<u64>,
    #[serde(alias = "language")]
    pub lang: Option<String>,
    pub country: Option<String>,
    #[serde(alias = "timeRange")]
    pub tbs: Option<String>,
    #[serde(alias = "scrapeResults", deserialize_with = "flexible_bool")]
    pub scrape_results: Option<bool>,
}

/// `POST /map` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MapParams {
    pub url: Option<String>,
    #[serde(alias = "searchFilter", alias = "search")]
    pub search_beta: Option<String>,
    #[serde(alias = "includeSubdomains", deserialize_with = "flexible_bool")]
    pub include_subdomains: Option<bool>,
    #[serde(alias = "ignoreSitemap", deserialize_with = "flexible_bool")]
    pub ignore_sitemap: Option<bool>,
    /// Not applicable to mapping; kept so a misdirected request gets a
    /// pointed hint instead of a silent drop.
    #[serde(
        alias = "onlyMainContent",
        alias = "extractMainContent",
        deserialize_with = "flexible_bool"
    )]
    pub extract_main_content: Option<bool>,
}

/// `POST /extract` parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    pub url: Option<String>,
    pub urls: Option<Vec<String>>,
    #[serde(alias = "extractPrompt", alias = "prompt")]
    pub extract_prompt: Option<String>,
    #[serde(alias = "enableAgent", deserialize_with = "flexible_bool")]
    pub enable_agent: Option<bool>,
    #[serde(alias = "enableWebSearch", deserialize_with = "flexible_bool")]
    pub enable_web_search: Option<bool>,
    pub schema: Option<Value>,
    #[serde(alias = "excludeTags")]
    pub exclude_tags: Option<StringOrList>,
}
