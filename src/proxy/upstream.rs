use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::config::Config;
use crate::proxy::error::ProxyError;

const API_KEY_HEADER: &str = "X-RapidAPI-Key";
const API_HOST_HEADER: &str = "X-RapidAPI-Host";

/// Forwards catalog requests upstream with the RapidAPI credentials attached.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: Client,
    api_key: String,
    api_host: String,
    base_url: String,
    key_preview: String,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: Client::new(),
            api_key: config.rapidapi_key.clone(),
            api_host: config.rapidapi_host.clone(),
            base_url: config.upstream_base_url.clone(),
            key_preview: config.key_preview(),
        }
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(endpoint))
    }

    /// Issues `GET {base}/{endpoint}?{params}` and returns the upstream JSON body.
    pub async fn forward(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Value, ProxyError> {
        let url = self.endpoint_url(endpoint);

        info!(url = %url, params = ?params, "Proxying request to Deezer API");
        info!(
            "Request headers: {}: {}, {}: {}",
            API_KEY_HEADER, self.key_preview, API_HOST_HEADER, self.api_host
        );

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_HOST_HEADER, &self.api_host)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    error!(url = %url, error = %e, "Failed to build upstream request");
                    ProxyError::Request(e.to_string())
                } else {
                    error!(url = %url, error = %e, "No response received from upstream");
                    ProxyError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(|e| {
            error!(url = %url, status = %status, error = %e, "Failed to read upstream body");
            ProxyError::Transport(e.to_string())
        })?;

        let body = parse_body(&text);

        if !status.is_success() {
            error!(
                url = %url,
                status = %status,
                headers = ?headers,
                body = %text,
                "Upstream returned an error response"
            );
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

/// JSON bodies are relayed as-is; anything else becomes a JSON string.
fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
