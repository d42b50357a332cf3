//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::api::RestApi;
use crate::cart::JsonFileStorage;
use crate::{ClientResult, NetworkHttpClient};

/// Restaurant API the client talks to when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://codealpha-restaurant-management-system-1.onrender.com/api";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default refresh interval of the tracking and kitchen views
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default directory for the persisted cart session
pub const DEFAULT_STORAGE_DIR: &str = ".order-client";

/// Client configuration for connecting to the restaurant API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL including the API prefix (e.g., "http://localhost:5000/api")
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Interval between status polls
    pub poll_interval: Duration,

    /// Directory holding the persisted cart session
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    /// Create a new client configuration with defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `ORDER_API_URL`
    /// - `ORDER_API_TIMEOUT_SECS`
    /// - `ORDER_POLL_INTERVAL_SECS`
    /// - `ORDER_STORAGE_DIR`
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var("ORDER_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(base_url);
        if let Some(secs) = env_secs("ORDER_API_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("ORDER_POLL_INTERVAL_SECS") {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(dir) = std::env::var("ORDER_STORAGE_DIR")
            .ok()
            .filter(|s| !s.is_empty())
        {
            config.storage_dir = PathBuf::from(dir);
        }
        config
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the session storage directory
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<NetworkHttpClient> {
        NetworkHttpClient::new(&self.base_url, self.timeout)
    }

    /// Create the REST API facade from this configuration
    pub fn build_api(&self) -> ClientResult<RestApi> {
        Ok(RestApi::new(self.build_http_client()?))
    }

    /// File storage for the cart session
    pub fn session_storage(&self) -> JsonFileStorage {
        JsonFileStorage::in_dir(&self.storage_dir)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn env_secs(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|secs| *secs > 0)
}
