//! Authenticated JSON fetching.
//!
//! Every read against the game API goes through [`Fetcher::get_json`], which
//! never fails: problems are logged and surface as [`Fetched::Unavailable`]
//! so callers branch on an explicit case instead of an empty payload.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;

/// Errors raised while building a fetcher or an endpoint URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Why a fetch produced no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// No API key configured; no request was made
    MissingCredential,

    /// Non-success HTTP status
    Status { status: u16, message: String },

    /// Network or transport failure
    Transport(String),

    /// Response body was not the expected JSON
    Decode(String),
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unavailable::MissingCredential => write!(f, "API key not configured"),
            Unavailable::Status { status, message } => write!(f, "HTTP {}: {}", status, message),
            Unavailable::Transport(e) => write!(f, "transport error: {}", e),
            Unavailable::Decode(e) => write!(f, "decode error: {}", e),
        }
    }
}

/// Outcome of a single read.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Available(T),
    Unavailable(Unavailable),
}

impl<T> Fetched<T> {
    /// Convert into an `Option`, dropping the reason.
    pub fn ok(self) -> Option<T> {
        match self {
            Fetched::Available(value) => Some(value),
            Fetched::Unavailable(_) => None,
        }
    }
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// API root; endpoint paths are appended to it
    pub base_url: String,

    /// Bearer token
    pub api_key: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.clashofclans.com/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            user_agent: concat!("clan-war-bot/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl From<&ApiConfig> for FetcherConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            api_key: api.api_key.clone().filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(api.timeout_seconds),
            ..Default::default()
        }
    }
}

/// HTTP fetcher bound to one API root and credential.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("clan-war-bot")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Build the URL for an endpoint from raw path segments.
    ///
    /// Segments are percent-encoded, so tags like `#2LG8PVY8R` become
    /// `%232LG8PVY8R`.
    pub fn endpoint_url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.config.base_url.clone()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// GET an endpoint and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Fetched<T> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            warn!("API key not configured, skipping /{}", segments.join("/"));
            return Fetched::Unavailable(Unavailable::MissingCredential);
        };

        let url = match self.endpoint_url(segments) {
            Ok(url) => url,
            Err(e) => {
                warn!("{}", e);
                return Fetched::Unavailable(Unavailable::Transport(e.to_string()));
            }
        };

        debug!("Fetching {}", url);

        let response = match self.client.get(url.as_str()).bearer_auth(api_key).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                return Fetched::Unavailable(Unavailable::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(100).collect();
            warn!("API error for {}: status {}, response: {}", url, status, preview);
            return Fetched::Unavailable(Unavailable::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        match response.json::<T>().await {
            Ok(value) => Fetched::Available(value),
            Err(e) => {
                warn!("Could not decode response from {}: {}", url, e);
                Fetched::Unavailable(Unavailable::Decode(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(api_key: Option<&str>) -> Fetcher {
        Fetcher::new(FetcherConfig {
            base_url: "https://api.example.com/v1".to_string(),
            api_key: api_key.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_url_encodes_tags() {
        let url = fetcher(None)
            .endpoint_url(&["clans", "#2LG8PVY8R", "currentwar"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/clans/%232LG8PVY8R/currentwar"
        );
    }

    #[test]
    fn test_endpoint_url_trailing_slash_base() {
        let f = Fetcher::new(FetcherConfig {
            base_url: "https://api.example.com/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        let url = f.endpoint_url(&["clans", "#A"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/clans/%23A");
    }

    #[test]
    fn test_endpoint_url_invalid_base() {
        let f = Fetcher::new(FetcherConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            f.endpoint_url(&["clans"]),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_credential_skips_request() {
        let result: Fetched<serde_json::Value> = fetcher(None).get_json(&["clans", "#A"]).await;
        assert_eq!(
            result,
            Fetched::Unavailable(Unavailable::MissingCredential)
        );
    }

    #[test]
    fn test_fetcher_config_from_api_config() {
        let api = ApiConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        let config = FetcherConfig::from(&api);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}/v1", addr)
    }

    fn fetcher_at(base_url: String) -> Fetcher {
        Fetcher::new(FetcherConfig {
            base_url,
            api_key: Some("secret".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_json_sends_bearer_and_encoded_path() {
        let router = axum::Router::new().fallback(
            |headers: axum::http::HeaderMap, uri: axum::http::Uri| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                axum::Json(serde_json::json!({ "auth": auth, "path": uri.path() }))
            },
        );
        let base = serve(router).await;

        let result: Fetched<serde_json::Value> =
            fetcher_at(base).get_json(&["clans", "#A"]).await;

        let Fetched::Available(body) = result else {
            panic!("expected data");
        };
        assert_eq!(body["auth"], "Bearer secret");
        assert_eq!(body["path"], "/v1/clans/%23A");
    }

    #[tokio::test]
    async fn test_get_json_error_status() {
        let router = axum::Router::new()
            .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "notFound") });
        let base = serve(router).await;

        let result: Fetched<serde_json::Value> =
            fetcher_at(base).get_json(&["clans", "#A"]).await;

        assert!(matches!(
            result,
            Fetched::Unavailable(Unavailable::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_json_undecodable_body() {
        let router = axum::Router::new().fallback(|| async { "<html>maintenance</html>" });
        let base = serve(router).await;

        let result: Fetched<serde_json::Value> =
            fetcher_at(base).get_json(&["clans", "#A"]).await;

        assert!(matches!(result, Fetched::Unavailable(Unavailable::Decode(_))));
    }

    #[tokio::test]
    async fn test_get_json_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result: Fetched<serde_json::Value> = fetcher_at(format!("http://{}/v1", addr))
            .get_json(&["clans", "#A"])
            .await;

        assert!(matches!(result, Fetched::Unavailable(Unavailable::Transport(_))));
    }
}
