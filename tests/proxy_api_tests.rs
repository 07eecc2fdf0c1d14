/// Proxy HTTP tests
/// Drives the router with oneshot requests against a fake upstream
mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{proxy_router, spawn_upstream, test_config};
use deezer_discover::{AppError, Config, ProxyState};
use serde_json::{Value, json};
use tower::util::ServiceExt;

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body_bytes).unwrap())
}

/// Test that the upstream body is relayed verbatim with credentials injected
#[tokio::test]
async fn test_search_relays_upstream_body() {
    let (upstream, recorded) = spawn_upstream().await;
    let app = proxy_router(&upstream);

    let (status, body) = get_json(app, "/api/deezer/search?q=adele").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "Hello");
    assert_eq!(body["data"][0]["artist"]["name"], "Adele");
    assert_eq!(body["data"][0]["artist"]["id"], 75798);
    assert_eq!(body["total"], 1);
    assert_eq!(recorded.queries(), vec!["adele"]);
}

/// Test that every query parameter reaches upstream
#[tokio::test]
async fn test_all_params_forwarded() {
    let (upstream, _recorded) = spawn_upstream().await;
    let app = proxy_router(&upstream);

    let (status, body) = get_json(app, "/api/deezer/search?q=daft%20punk&limit=5&index=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["params"],
        json!({"q": "daft punk", "limit": "5", "index": "10"})
    );
}

/// Test that parameters reach upstream in order with duplicates kept
#[tokio::test]
async fn test_params_order_and_duplicates_preserved() {
    let (upstream, recorded) = spawn_upstream().await;
    let app = proxy_router(&upstream);

    let (status, _body) = get_json(app, "/api/deezer/search?q=a&q=b&limit=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(recorded.raw_queries(), vec!["q=a&q=b&limit=5"]);
    assert_eq!(recorded.queries(), vec!["a", "b"]);
}

/// Test that an upstream 403 keeps its status and body inside the envelope
#[tokio::test]
async fn test_upstream_forbidden_relayed() {
    let (upstream, _recorded) = spawn_upstream().await;
    let app = proxy_router(&upstream);

    let (status, body) = get_json(app, "/api/deezer/forbidden").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({
            "message": "Failed to fetch data from Deezer API",
            "error": {"message": "You are not subscribed to this API."}
        })
    );
}

/// Test that a non-JSON error body is relayed as a string
#[tokio::test]
async fn test_plain_text_error_relayed_as_string() {
    let (upstream, _recorded) = spawn_upstream().await;
    let app = proxy_router(&upstream);

    let (status, body) = get_json(app, "/api/deezer/plain").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Failed to fetch data from Deezer API");
    assert_eq!(body["error"], "Bad Gateway");
}

/// Test that wrong credentials surface as the upstream's 401
#[tokio::test]
async fn test_upstream_sees_injected_credentials() {
    let (upstream, _recorded) = spawn_upstream().await;
    let mut config = test_config(&upstream);
    config.rapidapi_key = "some-other-key".to_string();
    let app = deezer_discover::create_router(ProxyState::new(&config).unwrap());

    let (status, body) = get_json(app, "/api/deezer/search?q=adele").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid API key");
}

/// Test that an unreachable upstream yields the fixed 500 response
#[tokio::test]
async fn test_unreachable_upstream_is_500() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = proxy_router(&format!("http://{}", addr));
    let (status, body) = get_json(app, "/api/deezer/search?q=adele").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "message": "Failed to fetch data from Deezer API",
            "error": "An unexpected error occurred."
        })
    );
}

/// Test that traversal in the endpoint is rejected before reaching upstream
#[tokio::test]
async fn test_traversal_endpoint_rejected() {
    let (upstream, recorded) = spawn_upstream().await;
    let app = proxy_router(&upstream);

    let (status, body) = get_json(app, "/api/deezer/..%2Fadmin").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Failed to fetch data from Deezer API");
    assert!(recorded.paths().is_empty());
}

/// Test GET /api/health
#[tokio::test]
async fn test_health() {
    let app = proxy_router("http://127.0.0.1:9");

    let (status, body) = get_json(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

/// Test that the proxy cannot be built without credentials
#[test]
fn test_missing_key_refuses_to_start() {
    let config = Config::from_lookup(|_| None).unwrap();

    let result = ProxyState::new(&config);

    assert!(matches!(result, Err(AppError::Config(_))));
}
