/// Shared fixtures: a fake RapidAPI upstream and proxy helpers
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use deezer_discover::{Config, ProxyState, create_router};
use serde_json::{Map, Value, json};

pub const TEST_KEY: &str = "test-key-0123456789";
pub const TEST_HOST: &str = "deezerdevs-deezer.p.rapidapi.com";

/// Requests seen by the fake upstream, as (path, raw query string)
#[derive(Clone, Default)]
pub struct Recorded(pub Arc<Mutex<Vec<(String, String)>>>);

impl Recorded {
    pub fn paths(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Query strings exactly as they arrived upstream
    pub fn raw_queries(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(_, q)| q.clone()).collect()
    }

    /// Values of every `q` parameter, in request order
    pub fn queries(&self) -> Vec<String> {
        self.raw_queries()
            .iter()
            .flat_map(|raw| params(raw))
            .filter(|(name, _)| name == "q")
            .map(|(_, value)| value)
            .collect()
    }

    fn push(&self, path: &str, raw_query: Option<String>) {
        self.0
            .lock()
            .unwrap()
            .push((path.to_string(), raw_query.unwrap_or_default()));
    }
}

fn params(raw_query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw_query.as_bytes())
        .into_owned()
        .collect()
}

async fn search(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let params = params(raw_query.as_deref().unwrap_or_default());
    recorded.push("/search", raw_query);

    let key = headers.get("x-rapidapi-key").and_then(|v| v.to_str().ok());
    let host = headers.get("x-rapidapi-host").and_then(|v| v.to_str().ok());
    if key != Some(TEST_KEY) || host != Some(TEST_HOST) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key"})),
        )
            .into_response();
    }

    let query = params
        .iter()
        .find(|(name, _)| name == "q")
        .map(|(_, value)| value.clone())
        .unwrap_or_default();
    let data = if query == "adele" {
        json!([{
            "id": 1,
            "title": "Hello",
            "artist": {"id": 75798, "name": "Adele"},
            "preview": "http://cdn.example.com/1.mp3"
        }])
    } else if query == "nothing-matches-this" {
        json!([])
    } else {
        json!([{
            "id": 42,
            "title": query,
            "artist": {"name": "Various"},
            "preview": "http://cdn.example.com/42.mp3"
        }])
    };

    let echoed: Map<String, Value> = params
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    Json(json!({"data": data, "total": 1, "params": echoed})).into_response()
}

async fn forbidden(State(recorded): State<Recorded>) -> Response {
    recorded.push("/forbidden", None);
    (
        StatusCode::FORBIDDEN,
        Json(json!({"message": "You are not subscribed to this API."})),
    )
        .into_response()
}

async fn plain_error(State(recorded): State<Recorded>) -> Response {
    recorded.push("/plain", None);
    (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
}

/// Starts the fake upstream on an ephemeral port and returns its base URL
pub async fn spawn_upstream() -> (String, Recorded) {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/search", get(search))
        .route("/forbidden", get(forbidden))
        .route("/plain", get(plain_error))
        .with_state(recorded.clone());

    (spawn(router).await, recorded)
}

/// Serves `router` on 127.0.0.1 and returns `http://addr`
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn test_config(upstream_base_url: &str) -> Config {
    Config {
        rapidapi_key: TEST_KEY.to_string(),
        rapidapi_host: TEST_HOST.to_string(),
        port: 0,
        upstream_base_url: upstream_base_url.to_string(),
    }
}

pub fn proxy_router(upstream_base_url: &str) -> Router {
    create_router(ProxyState::new(&test_config(upstream_base_url)).unwrap())
}
