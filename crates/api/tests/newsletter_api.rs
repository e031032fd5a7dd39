//! Integration tests for the newsletter endpoint.

mod common;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use common::body_json;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: newsletter publishing disabled returns 404 before any auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn disabled_newsletter_returns_404() {
    // build_test_app configures no Listmonk client
    let app = common::build_test_app(None);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/send-newsletter/7")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"user": 1, "token": "tok"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Newsletter publishing is not enabled");
}
