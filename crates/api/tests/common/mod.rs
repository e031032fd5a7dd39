use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use hareline_api::router::build_app_router;
use hareline_api::state::AppState;
use hareline_core::settings::EventSettings;

/// Build test `EventSettings` with safe defaults.
pub fn test_settings() -> EventSettings {
    EventSettings {
        hash_kennels: vec!["Berlin H3".to_string()],
        default_kennel: Some("Berlin H3".to_string()),
        default_event_type: "Hash Run".to_string(),
        default_hash_cash: Some(5),
        default_hash_cash_non_members: None,
        default_currency: Some("\u{20ac}".to_string()),
        default_facebook_group_id: None,
        timezone: None,
        maps_url_template: "https://www.openstreetmap.org/#map=17/{lat}/{long}".to_string(),
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so the tests exercise
/// the same middleware stack (request ID, timeout, tracing, panic
/// recovery) that production uses. The pool is lazy and never connects:
/// these tests only exercise request paths that are rejected before any
/// query runs.
pub fn build_test_app(api_token: Option<&str>) -> Router {
    let pool = sqlx::mysql::MySqlPoolOptions::new()
        .connect_lazy("mysql://wp:wp@localhost/wordpress")
        .expect("valid connection string");

    let state = AppState {
        pool,
        settings: Arc::new(test_settings()),
        listmonk: None,
        api_token: api_token.map(Arc::from),
    };

    build_app_router(state, 30)
}

/// Helper: perform a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request"),
    )
    .await
    .expect("request handled")
}

/// Helper: parse a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collected")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("valid JSON body")
}
