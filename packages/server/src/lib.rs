//! Connector core: the HTTP surface that adapts simplified scrape,
//! crawl, map, search, and extract parameters onto the Firecrawl API
//! and reshapes the provider's responses into the connector envelope.

pub mod config;
pub mod requests;
pub mod server;
pub mod translate;

pub use config::Config;
