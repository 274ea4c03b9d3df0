//! Runtime Configuration
//!
//! Credentials come from the process environment, optionally seeded from a
//! `.env` file in the working directory. Values already exported in the
//! environment take precedence over the file.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

/// API origin, e.g. `https://api.cloudflare.com/client/v4`
pub const BASE_URL_ENV: &str = "BASE_URL";
/// Bearer token for the account
pub const API_TOKEN_ENV: &str = "ACCOUNT_API_TOKEN";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BASE_URL is not set")]
    MissingBaseUrl,

    #[error("ACCOUNT_API_TOKEN is not set")]
    MissingToken,

    #[error("BASE_URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}

/// Validated settings for one report run
#[derive(Clone)]
pub struct Config {
    /// API origin without a trailing slash
    pub base_url: String,
    pub api_token: String,
    pub timeout: Duration,
}

impl Config {
    /// Validate raw values. Empty strings count as unset.
    pub fn new(
        base_url: Option<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }

        let api_token = api_token
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            base_url,
            api_token,
            timeout,
        })
    }
}

// Keep the token out of debug logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_token", &format_args!("<{} bytes>", self.api_token.len()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Load `.env` from the working directory (or a parent) if one exists.
///
/// Returns the path that was loaded. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!("Ignoring unreadable .env file: {}", e);
            None
        }
    }
}

/// Remove the credential variables from this process's environment.
pub fn clear_credentials() {
    debug!("Clearing {} and {} from the environment", BASE_URL_ENV, API_TOKEN_ENV);
    env::remove_var(BASE_URL_ENV);
    env::remove_var(API_TOKEN_ENV);
}

/// Clear credentials once a report has been printed, unless asked to keep
/// them. Returns whether the variables were removed.
pub fn clear_after_run(completed: bool, keep_env: bool) -> bool {
    if !completed || keep_env {
        debug!(completed, keep_env, "Leaving credentials in the environment");
        return false;
    }
    clear_credentials();
    true
}
