//! HTTP server: application wiring, routes, envelopes, error mapping.

pub mod app;
pub mod envelope;
pub mod error;
pub mod routes;

pub use app::{build_app, AppState};
