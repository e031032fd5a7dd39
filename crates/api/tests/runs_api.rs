//! Integration tests for the run endpoints and general HTTP behaviour.
//!
//! The middleware stack and handlers are exercised through the real
//! router; every request here is rejected before a database query runs,
//! so no live WordPress store is needed.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, get};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: missing API token is rejected with 403
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_api_token_returns_403() {
    let app = common::build_test_app(Some("hunter2"));
    let response = get(app, "/runs/all").await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json["code"], "TOKEN_INVALID");
}

// ---------------------------------------------------------------------------
// Test: wrong API token is rejected with 403
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wrong_api_token_returns_403() {
    let app = common::build_test_app(Some("hunter2"));

    let request = Request::builder()
        .uri("/runs/all")
        .header("Authorization", "Token wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Test: conflicting range filters return 422 naming the field
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conflicting_range_filters_return_422() {
    let app = common::build_test_app(None);
    let response = get(app, "/runs/all?run_number=5&run_number__gt=3").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(
        json["error"].as_str().unwrap().contains("run_number"),
        "validation error must name the offending field, got: {}",
        json["error"]
    );
}

// ---------------------------------------------------------------------------
// Test: unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(None);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app(Some("hunter2"));
    let response = get(app, "/runs/all").await;

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}
