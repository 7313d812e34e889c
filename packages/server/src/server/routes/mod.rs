// HTTP routes
pub mod crawl;
pub mod extract;
pub mod health;
pub mod map;
pub mod scrape;
pub mod search;

pub use crawl::*;
pub use extract::*;
pub use health::*;
pub use map::*;
pub use scrape::*;
pub use search::*;

use url::Url;

use crate::server::error::ApiError;

/// Validate a required URL parameter. Only absolute http(s) URLs are
/// accepted; anything else is rejected before touching the upstream.
pub(crate) fn require_url(url: Option<String>) -> Result<String, ApiError> {
    let raw = url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::validation("URL parameter is required"))?;
    let parsed = Url::parse(&raw)
        .map_err(|_| ApiError::validation(format!("invalid URL: {raw}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::validation(
            "URL must be absolute and start with http:// or https://",
        ));
    }
    Ok(raw)
}
