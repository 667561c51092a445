//! Router integration tests. The backend URL points at a closed local port,
//! so upstream calls fail fast and the fallback paths are what get
//! exercised — no network access required.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::util::ServiceExt;

use iriscope_web::config::{BackendConfig, Config, ServerConfig};
use iriscope_web::router::build_router;
use iriscope_web::state::AppState;

fn test_app() -> axum::Router {
    let config = Config {
        server: ServerConfig::default(),
        backend: BackendConfig {
            // Discard-port address: connections are refused immediately.
            base_url: "http://127.0.0.1:9".to_string(),
            environment: "development".to_string(),
        },
    };
    build_router(AppState::new(config))
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn upload_page_renders() {
    let resp = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("Retinal Image Analysis"));
    assert!(body.contains("Backend API Status"));
}

#[tokio::test]
async fn dashboard_demo_mode_renders_demo_record() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .uri("/dashboard?demo=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("demo-12345"));
    assert!(body.contains("Mild Diabetic Retinopathy"));
}

#[tokio::test]
async fn dashboard_falls_back_when_backend_unreachable() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .uri("/dashboard?analysis_id=abc-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    // The page always renders; the fetch failure falls back to the demo
    // record under the requested id.
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("abc-1"));
    assert!(body.contains("Diabetic Retinopathy"));
}

#[tokio::test]
async fn reports_page_prompts_without_session() {
    let resp = test_app()
        .oneshot(Request::builder().uri("/reports").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("No analysis available yet"));
}

#[tokio::test]
async fn consult_without_analysis_id_is_rejected() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/consult")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"question": "Will it get worse?"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_string(resp).await;
    assert!(body.contains("No analysis id available"));
}

#[tokio::test]
async fn consult_with_id_falls_back_when_backend_unreachable() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/consult")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"question": "What is diabetic retinopathy?", "analysis_id": "abc-1"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("Diabetic retinopathy is an eye condition"));
}

#[tokio::test]
async fn status_reports_offline_backend() {
    let resp = test_app()
        .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_str(&body_string(resp).await).unwrap();
    assert_eq!(body["backend_url"], "http://127.0.0.1:9");
    let endpoints = body["endpoints"].as_array().unwrap();
    assert_eq!(endpoints.len(), 5);
    assert!(endpoints.iter().all(|e| e["status"] == "offline"));
}

#[tokio::test]
async fn analysis_fetch_surfaces_transport_error() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/analysis/abc-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_string(resp).await;
    assert!(body.contains("error"));
}

#[tokio::test]
async fn proxy_reports_upstream_failure_verbatim() {
    let resp = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/proxy/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value =
        serde_json::from_str(&body_string(resp).await).unwrap();
    assert!(body["error"].is_string());
}
