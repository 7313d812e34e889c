//! Shared test harness: a connector instance wired against a mock
//! upstream, listening on a real socket.

use std::sync::Arc;
use std::time::Duration;

use connector_core::server::{build_app, AppState};
use firecrawl_client::{BackoffPolicy, FirecrawlClient};
use serde_json::Value;
use wiremock::MockServer;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub upstream: MockServer,
}

impl TestApp {
    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("request failed")
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_poll_budget(60).await
}

/// Spawn the connector with millisecond-scale backoff schedules so
/// retry and polling paths run in test time.
pub async fn spawn_app_with_poll_budget(max_polls: u32) -> TestApp {
    let upstream = MockServer::start().await;

    let firecrawl = FirecrawlClient::new("test-key")
        .expect("client must build")
        .with_base_url(upstream.uri())
        .with_transport_policy(BackoffPolicy {
            base_delay: Duration::from_millis(5),
            multiplier: 2.0,
            max_attempts: 3,
            max_total_wait: Duration::from_secs(1),
        })
        .with_polling_policy(BackoffPolicy {
            base_delay: Duration::from_millis(5),
            multiplier: 1.0,
            max_attempts: max_polls,
            max_total_wait: Duration::from_secs(2),
        });

    let app = build_app(AppState {
        firecrawl: Arc::new(firecrawl),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .expect("test server exited");
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        upstream,
    }
}
