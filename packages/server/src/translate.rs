//! Parameter translation: connector fields to the vendor schema.
//!
//! Pure functions, deterministic, no I/O. Each endpoint gets one
//! builder from its public parameters to the corresponding vendor
//! request, including the derived fields the vendor has no structured
//! equivalent for (the exclusion instruction appended to extraction
//! prompts).

use firecrawl_client::{
    AgentConfig, CrawlRequest, ExtractRequest, MapRequest, ScrapeOptions, ScrapeRequest,
    SearchRequest,
};

use crate::requests::{CrawlParams, ExtractParams, MapParams, ScrapeParams, SearchParams};

/// Default page limit for crawls when the caller does not set one.
const DEFAULT_CRAWL_LIMIT: u32 = 10;

/// Formats requested when a search should also scrape its hits.
const SEARCH_SCRAPE_FORMATS: [&str; 2] = ["markdown", "links"];

pub fn scrape_request(url: String, params: &ScrapeParams) -> ScrapeRequest {
    ScrapeRequest {
        url,
        formats: params.formats.clone().filter(|f| !f.is_empty()),
        exclude_tags: params
            .exclude_tags
            .as_ref()
            .map(|t| t.to_tags())
            .filter(|t| !t.is_empty()),
        include_only_tags: params
            .include_only_tags
            .as_ref()
            .map(|t| t.to_tags())
            .filter(|t| !t.is_empty()),
        // Only an affirmative value is forwarded; the vendor default
        // stands otherwise.
        only_main_content: params.extract_main_content.filter(|&on| on),
        wait_for: params.wait_for,
        timeout: params.timeout,
    }
}

pub fn crawl_request(url: String, params: &CrawlParams) -> CrawlRequest {
    let scrape_options = ScrapeOptions {
        only_main_content: params.extract_main_content,
        include_tags: params
            .include_only_tags
            .as_ref()
            .map(|t| t.to_tags())
            .filter(|t| !t.is_empty()),
        exclude_tags: params
            .exclude_tags
            .as_ref()
            .map(|t| t.to_tags())
            .filter(|t| !t.is_empty()),
        wait_for: params.wait_for,
        timeout: params.timeout,
        formats: None,
    };

    CrawlRequest {
        url,
        limit: params
            .max_pages
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(DEFAULT_CRAWL_LIMIT),
        // stay_on_domain is the inverse of the vendor's external-links
        // switch.
        allow_external_links: params.stay_on_domain.map(|stay| !stay),
        allow_backward_links: params.follow_links,
        include_paths: params.include_only_urls.clone().filter(|p| !p.is_empty()),
        exclude_paths: params.exclude_urls.clone().filter(|p| !p.is_empty()),
        scrape_options: (!scrape_options.is_empty()).then_some(scrape_options),
    }
}

pub fn search_request(query: String, params: &SearchParams) -> SearchRequest {
    SearchRequest {
        query,
        limit: params.limit.map(|n| n.min(u32::MAX as u64) as u32),
        lang: trimmed(params.lang.as_deref()),
        country: trimmed(params.country.as_deref()),
        tbs: trimmed(params.tbs.as_deref()),
        scrape_options: params.scrape_results.unwrap_or(false).then(|| ScrapeOptions {
            formats: Some(
                SEARCH_SCRAPE_FORMATS
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
            ),
            ..Default::default()
        }),
    }
}

pub fn map_request(url: String, params: &MapParams) -> MapRequest {
    MapRequest {
        url,
        search: trimmed(params.search_beta.as_deref()),
        include_subdomains: params.include_subdomains.filter(|&on| on),
        ignore_sitemap: params.ignore_sitemap.filter(|&on| on),
    }
}

pub fn extract_request(urls: Vec<String>, prompt: &str, params: &ExtractParams) -> ExtractRequest {
    ExtractRequest {
        urls,
        prompt: compose_extract_prompt(prompt, params),
        schema: params.schema.clone(),
        agent: params
            .enable_agent
            .unwrap_or(false)
            .then(AgentConfig::fire_1),
        enable_web_search: params.enable_web_search.unwrap_or(false),
    }
}

/// The vendor has no structured "exclude these sections" parameter for
/// extraction, so the exclusion becomes part of the instruction text.
/// Formatting is fixed so identical inputs always produce identical
/// prompts.
fn compose_extract_prompt(prompt: &str, params: &ExtractParams) -> String {
    let tags = params
        .exclude_tags
        .as_ref()
        .map(|t| t.to_tags())
        .unwrap_or_default();
    if tags.is_empty() {
        return prompt.to_string();
    }
    format!(
        "{prompt}\n\nIgnore any content found inside these page sections: {}.",
        tags.join(", ")
    )
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
