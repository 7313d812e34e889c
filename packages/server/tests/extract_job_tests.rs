mod common;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::spawn_app;

#[tokio::test]
async fn extract_awaits_job_and_returns_data() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "id": "ex-1", "status": "processing"
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/extract/ex-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing"
        })))
        .up_to_n_times(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/extract/ex-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "data": { "products": ["Widget", "Gadget"] }
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .post(
            "/extract",
            &json!({
                "url": "https://example.com/catalog",
                "extract_prompt": "List the product names"
            }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["extracted_elements"]["products"],
        json!(["Widget", "Gadget"])
    );
    assert_eq!(body["extraction_info"]["type"], "extract");
    assert_eq!(
        body["extraction_info"]["url"],
        "https://example.com/catalog"
    );
    assert_eq!(body["execution_metadata"]["success"], true);
}

#[tokio::test]
async fn extract_appends_exclusions_to_prompt() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_partial_json(json!({
            "auxiliarPrompt":
                "List the product names\n\nIgnore any content found inside these page sections: #footer, #nav."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "id": "ex-1", "status": "processing"
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/extract/ex-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed", "data": {}
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .post(
            "/extract",
            &json!({
                "url": "https://example.com",
                "extract_prompt": "List the product names",
                "excludeTags": "#footer, #nav"
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn extract_with_agent_returns_job_handle() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_partial_json(json!({ "agent": { "model": "FIRE-1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "id": "ex-agent",
            "status": "processing",
            "expiresAt": "2026-09-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app
        .post(
            "/extract",
            &json!({
                "url": "https://example.com",
                "extract_prompt": "Find the pricing table",
                "enableAgent": true
            }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["job_id"], "ex-agent");
    assert_eq!(body["status"], "processing");
    assert!(body.get("extracted_elements").is_none());
    assert_eq!(body["job_info"]["url"], "https://example.com");
}

#[tokio::test]
async fn extract_job_status_is_passed_through() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/extract/ex-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "data": { "names": ["Alpha"] }
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;

    let response = app.get("/extract/job/ex-9").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["job_id"], "ex-9");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["data"]["names"], json!(["Alpha"]));
}

#[tokio::test]
async fn extract_failed_job_is_500_with_detail() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "id": "ex-1", "status": "processing"
        })))
        .mount(&app.upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/extract/ex-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "failed", "error": "could not render page"
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .post(
            "/extract",
            &json!({
                "url": "https://example.com",
                "extract_prompt": "List the product names"
            }),
        )
        .await;
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("could not render page"));
}

#[tokio::test]
async fn extract_without_prompt_is_400() {
    let app = spawn_app().await;

    let response = app
        .post("/extract", &json!({ "url": "https://example.com" }))
        .await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("extract_prompt"));
}

#[tokio::test]
async fn extract_accepts_multiple_urls() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_partial_json(json!({
            "urls": ["https://example.com/a", "https://example.com/b"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "id": "ex-1", "status": "processing"
        })))
        .expect(1)
        .mount(&app.upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/extract/ex-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed", "data": {}
        })))
        .mount(&app.upstream)
        .await;

    let response = app
        .post(
            "/extract",
            &json!({
                "urls": ["https://example.com/a", "https://example.com/b"],
                "extract_prompt": "Compare the two pages"
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
}
