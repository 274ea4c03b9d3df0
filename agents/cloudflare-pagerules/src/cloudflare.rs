//! Cloudflare API Client
//!
//! Read-only wrapper over the v4 REST API endpoints the page-rule report
//! needs: token verification, zone listing and per-zone page rules.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Errors returned by [`CloudflareClient`] calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The body was not the JSON shape we expected
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The token contains bytes that cannot go into a header
    #[error("API token is not a valid header value")]
    InvalidToken,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

// ============================================================
// API Response Types
// ============================================================

/// Standard Cloudflare response envelope
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    pub result: Option<T>,
    #[serde(default)]
    pub result_info: Option<ResultInfo>,
}

impl<T> ApiResponse<T> {
    /// Joined error messages, for logging unsuccessful responses
    pub fn error_messages(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn total_pages(&self) -> u32 {
        self.result_info
            .as_ref()
            .and_then(|info| info.total_pages)
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ResultInfo {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageRule {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<PageRuleAction>>,
}

impl PageRule {
    /// Id of the first action, if the rule has one.
    ///
    /// Rules with a missing, null or empty `actions` list yield `None`.
    pub fn first_action_id(&self) -> Option<&str> {
        self.actions
            .as_deref()
            .and_then(|actions| actions.first())
            .and_then(|action| action.id.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageRuleAction {
    #[serde(default)]
    pub id: Option<String>,
}

// ============================================================
// Client Implementation
// ============================================================

/// Cloudflare API client
pub struct CloudflareClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl CloudflareClient {
    /// Build a client for the configured API origin.
    ///
    /// One `reqwest::Client` is kept for the whole run so connections are reused.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("lornu-cloudflare-pagerules/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_token))
            .map_err(|_| ApiError::InvalidToken)?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// GET `path` relative to the base URL and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        page: Option<u32>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, page = ?page, "GET");

        let mut request = self.client.get(&url).headers(self.auth_headers()?);
        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }

        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { url, source })
    }

    /// `GET /user/tokens/verify`
    pub async fn verify_token(&self) -> Result<ApiResponse<serde_json::Value>, ApiError> {
        self.get_json("/user/tokens/verify", None).await
    }

    /// `GET /zones`, optionally for a specific page
    pub async fn list_zones(&self, page: Option<u32>) -> Result<ApiResponse<Vec<Zone>>, ApiError> {
        self.get_json("/zones", page).await
    }

    /// `GET /zones/{zone_id}/pagerules`
    pub async fn list_page_rules(
        &self,
        zone_id: &str,
    ) -> Result<ApiResponse<Vec<PageRule>>, ApiError> {
        self.get_json(&format!("/zones/{}/pagerules", zone_id), None)
            .await
    }
}
