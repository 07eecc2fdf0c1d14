use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const FAILURE_MESSAGE: &str = "Failed to fetch data from Deezer API";
pub const TRANSPORT_FAILURE: &str = "An unexpected error occurred.";

/// Failures of a single proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream responded with {status}")]
    Upstream { status: u16, body: Value },

    #[error("no response from upstream: {0}")]
    Transport(String),

    #[error("could not build upstream request: {0}")]
    Request(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Body returned for every failed proxy request.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub message: String,
    pub error: Value,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::Transport(_) | ProxyError::Request(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::InvalidEndpoint(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let error = match self {
            ProxyError::Upstream { body, .. } => body.clone(),
            ProxyError::Transport(_) => Value::String(TRANSPORT_FAILURE.to_string()),
            ProxyError::Request(msg) => Value::String(msg.clone()),
            ProxyError::InvalidEndpoint(endpoint) => {
                Value::String(format!("Invalid endpoint: {}", endpoint))
            }
        };

        ErrorEnvelope {
            message: FAILURE_MESSAGE.to_string(),
            error,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}
