use crate::error::{AppError, Result};

pub const DEFAULT_RAPIDAPI_HOST: &str = "deezerdevs-deezer.p.rapidapi.com";
pub const DEFAULT_PORT: u16 = 3001;
const PLACEHOLDER_KEY: &str = "YOUR_RAPIDAPI_KEY_HERE";

#[derive(Debug, Clone)]
pub struct Config {
    pub rapidapi_key: String,
    pub rapidapi_host: String,
    pub port: u16,
    /// Origin requests are forwarded to. Defaults to `https://{rapidapi_host}`.
    pub upstream_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source. Credentials are
    /// checked separately by [`Config::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rapidapi_key = lookup("RAPIDAPI_KEY")
            .map(|key| key.trim().to_string())
            .unwrap_or_default();

        let rapidapi_host = lookup("RAPIDAPI_HOST")
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RAPIDAPI_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        let upstream_base_url = lookup("RAPIDAPI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{}", rapidapi_host));

        Ok(Self {
            rapidapi_key,
            rapidapi_host,
            port,
            upstream_base_url,
        })
    }

    pub fn get_missing_config(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.rapidapi_key.is_empty() || self.rapidapi_key == PLACEHOLDER_KEY {
            missing.push("RAPIDAPI_KEY".to_string());
        }

        missing
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.get_missing_config();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(format!("{} not set", missing.join(", "))))
        }
    }

    /// The first 10 characters of the key, safe to print in logs.
    pub fn key_preview(&self) -> String {
        let prefix: String = self.rapidapi_key.chars().take(10).collect();
        format!("{}...", prefix)
    }
}
