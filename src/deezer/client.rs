use std::future::Future;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::deezer::models::{SearchResponse, Track};
use crate::error::{AppError, Result};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";

/// Anything that can turn a query into a list of tracks.
pub trait TrackSearch: Send + Sync + 'static {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Track>>> + Send;
}

/// Client for the proxy's `/api/deezer/{endpoint}` route.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http_client: Client,
    base_url: Url,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "backend URL cannot be used as a base: {}",
                base_url
            )));
        }

        Ok(Self {
            http_client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/deezer/{}",
            self.base_url.as_str().trim_end_matches('/'),
            urlencoding::encode(endpoint)
        )
    }

    /// Fetches any catalog endpoint through the proxy and returns the raw JSON body.
    pub async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.endpoint_url(endpoint);
        debug!("Fetching {} with {} params", url, params.len());

        let response = self.http_client.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&error_text)
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(error_text);
            warn!("Proxy request to {} failed ({}): {}", url, status, message);
            return Err(AppError::Proxy {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    pub async fn search_tracks(&self, query: &str) -> Result<Vec<Track>> {
        let body = self.fetch("search", &[("q", query)]).await?;
        let response: SearchResponse = serde_json::from_value(body)?;

        debug!("Search '{}' returned {} tracks", query, response.data.len());

        Ok(response.data)
    }
}

impl TrackSearch for ProxyClient {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Track>>> + Send {
        self.search_tracks(query)
    }
}
