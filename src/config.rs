//! Export configuration
//!
//! Built once at startup from CLI flags, environment variables and the
//! interactive prompt, then passed by reference into every component.

use crate::downloader::config::{ExportTiming, DEFAULT_API_URL};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Store identifier missing or blank
    #[error("store id is not set (use --store-id or ECWID_STORE_ID)")]
    MissingStoreId,

    /// Access token missing or blank
    #[error("access token is not set (use --token or ECWID_ACCESS_TOKEN)")]
    MissingAccessToken,

    /// Resource name missing or blank
    #[error("no api method given")]
    EmptyResource,

    /// API base URL cannot be used
    #[error("invalid api url: {0}")]
    InvalidApiUrl(String),

    /// Prompt could not be read
    #[error("failed to read prompt: {0}")]
    Prompt(String),
}

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// How the access token travels with each request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `token=` query parameter, as the Ecwid docs show it
    #[default]
    Query,
    /// `Authorization: Bearer` header; keeps the token out of URLs and proxy logs
    Header,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "query" => Ok(AuthMode::Query),
            "header" => Ok(AuthMode::Header),
            _ => Err(format!("Invalid auth mode: {s}. Valid options: query, header")),
        }
    }
}

/// Throttle strategy for outbound calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThrottleMode {
    /// Sleep the full delay before every call
    #[default]
    Fixed,
    /// Sleep only what is left of the delay since the previous call started
    Interval,
}

impl FromStr for ThrottleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(ThrottleMode::Fixed),
            "interval" => Ok(ThrottleMode::Interval),
            _ => Err(format!(
                "Invalid throttle mode: {s}. Valid options: fixed, interval"
            )),
        }
    }
}

/// Everything one export run needs
#[derive(Clone)]
pub struct ExportConfig {
    /// Store identifier
    pub store_id: String,
    /// Access token
    pub access_token: String,
    /// Requested resource, e.g. `products` or `orders`
    pub resource: String,
    /// API base URL, always ending in `/`
    pub api_url: String,
    /// Token placement
    pub auth: AuthMode,
    /// Throttle strategy
    pub throttle: ThrottleMode,
    /// Directory the result file is written to
    pub output_dir: PathBuf,
    /// Delays and poll bound
    pub timing: ExportTiming,
}

impl ExportConfig {
    /// Build a configuration with defaults for everything but the credentials and resource
    pub fn new(
        store_id: impl Into<String>,
        access_token: impl Into<String>,
        resource: impl Into<String>,
    ) -> ConfigResult<Self> {
        let store_id = store_id.into().trim().to_string();
        if store_id.is_empty() {
            return Err(ConfigError::MissingStoreId);
        }

        let access_token = access_token.into().trim().to_string();
        if access_token.is_empty() {
            return Err(ConfigError::MissingAccessToken);
        }

        let resource = resource.into().trim().to_string();
        if resource.is_empty() {
            return Err(ConfigError::EmptyResource);
        }

        Ok(Self {
            store_id,
            access_token,
            resource,
            api_url: DEFAULT_API_URL.to_string(),
            auth: AuthMode::default(),
            throttle: ThrottleMode::default(),
            output_dir: PathBuf::from("."),
            timing: ExportTiming::default(),
        })
    }

    /// Override the API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> ConfigResult<Self> {
        let mut api_url = api_url.into().trim().to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }
        if !api_url.ends_with('/') {
            api_url.push('/');
        }
        self.api_url = api_url;
        Ok(self)
    }

    /// Set token placement
    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    /// Set throttle strategy
    pub fn with_throttle(mut self, throttle: ThrottleMode) -> Self {
        self.throttle = throttle;
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Override delays and poll bound
    pub fn with_timing(mut self, timing: ExportTiming) -> Self {
        self.timing = timing;
        self
    }
}

// Hand-written so the token never ends up in logs.
impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("store_id", &self.store_id)
            .field("access_token", &"****")
            .field("resource", &self.resource)
            .field("api_url", &self.api_url)
            .field("auth", &self.auth)
            .field("throttle", &self.throttle)
            .field("output_dir", &self.output_dir)
            .field("timing", &self.timing)
            .finish()
    }
}
