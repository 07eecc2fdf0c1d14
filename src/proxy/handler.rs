use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::Config;
use crate::proxy::error::ProxyError;
use crate::proxy::upstream::UpstreamClient;

/// Shared state for proxy handlers.
#[derive(Clone)]
pub struct ProxyState {
    pub upstream: Arc<UpstreamClient>,
}

impl ProxyState {
    /// Refuses to build without usable credentials.
    pub fn new(config: &Config) -> crate::Result<Self> {
        config.validate()?;

        Ok(Self {
            upstream: Arc::new(UpstreamClient::new(config)),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn create_router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/deezer/:endpoint", get(proxy_endpoint))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/deezer/:endpoint - forwards the endpoint and query string upstream
pub async fn proxy_endpoint(
    State(state): State<ProxyState>,
    Path(endpoint): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ProxyError> {
    if !is_valid_endpoint(&endpoint) {
        warn!(endpoint = %endpoint, "Rejected invalid endpoint");
        return Err(ProxyError::InvalidEndpoint(endpoint));
    }

    let body = state.upstream.forward(&endpoint, &params).await?;

    Ok(Json(body))
}

/// Endpoint names must be a single, non-traversing path segment.
fn is_valid_endpoint(endpoint: &str) -> bool {
    !endpoint.trim().is_empty()
        && !endpoint.contains('/')
        && !endpoint.contains('\\')
        && !endpoint.contains("..")
}
