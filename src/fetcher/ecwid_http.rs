//! Ecwid HTTP client
//!
//! Single entry point for every call to the Ecwid REST API:
//! - URL construction: `{api_url}{store_id}/{path}?{params}`
//! - access token as `token` query parameter or bearer header
//! - fixed JSON / no-cache headers, gzip responses
//! - rate limiter consulted before each request
//!
//! Failures are returned as [`FetcherError`]; nothing is retried.

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::{AuthMode, ExportConfig};
use crate::downloader::config::{HTTP_CONNECT_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS};
use crate::downloader::rate_limit::RateLimiter;
use crate::fetcher::{FetcherError, FetcherResult};
use crate::HttpMethod;

/// Longest response excerpt carried in error messages
const ERROR_BODY_PREVIEW: usize = 500;

/// HTTP client bound to one store
pub struct EcwidHttpClient {
    client: Client,
    store_url: String,
    access_token: String,
    auth: AuthMode,
    rate_limiter: Arc<RateLimiter>,
}

impl EcwidHttpClient {
    /// Create a client for `store_id`
    ///
    /// # Arguments
    /// * `client` - reqwest client (see [`EcwidHttpClient::build_client`])
    /// * `api_url` - API base ending in `/`, e.g. `https://app.ecwid.com/api/v3/`
    /// * `store_id` - Store identifier appended to the base
    /// * `access_token` - Credential sent with every request
    /// * `auth` - Where the credential goes
    /// * `rate_limiter` - Throttle consulted before each request
    pub fn new(
        client: Client,
        api_url: &str,
        store_id: &str,
        access_token: impl Into<String>,
        auth: AuthMode,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            client,
            store_url: format!("{api_url}{store_id}/"),
            access_token: access_token.into(),
            auth,
            rate_limiter,
        }
    }

    /// Create a client from an export configuration
    pub fn from_config(config: &ExportConfig, rate_limiter: Arc<RateLimiter>) -> FetcherResult<Self> {
        Ok(Self::new(
            Self::build_client()?,
            &config.api_url,
            &config.store_id,
            config.access_token.clone(),
            config.auth,
            rate_limiter,
        ))
    }

    /// Build a reqwest client with connect and request timeouts
    pub fn build_client() -> FetcherResult<Client> {
        Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .map_err(|e| FetcherError::RequestError(format!("failed to build HTTP client: {e}")))
    }

    /// Full URL of `path` without query parameters
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.store_url, path.trim_start_matches('/'))
    }

    /// Headers sent with every request
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers
    }

    /// Query parameters plus the token when it travels in the URL
    fn query_with_auth<'a>(&'a self, params: &[(&'a str, String)]) -> Vec<(&'a str, String)> {
        let mut query = params.to_vec();
        if self.auth == AuthMode::Query {
            query.push(("token", self.access_token.clone()));
        }
        query
    }

    /// Execute GET request with generic deserialization
    pub async fn get<T>(&self, path: &str, params: &[(&str, String)]) -> FetcherResult<T>
    where
        T: DeserializeOwned,
    {
        self.request(HttpMethod::Get, path, params, None).await
    }

    /// Execute POST request with a pre-serialized JSON body
    pub async fn post<T>(&self, path: &str, body: String) -> FetcherResult<T>
    where
        T: DeserializeOwned,
    {
        self.request(HttpMethod::Post, path, &[], Some(body)).await
    }

    /// Throttle, send, and decode one request
    ///
    /// # Errors
    /// - `NetworkError` when the request cannot be sent
    /// - `RateLimitError` on 429
    /// - `HttpError` on any other non-2xx status
    /// - `ParseError` when the body is not JSON of type `T`
    pub async fn request<T>(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, String)],
        body: Option<String>,
    ) -> FetcherResult<T>
    where
        T: DeserializeOwned,
    {
        self.rate_limiter.acquire().await;

        let url = self.endpoint_url(path);
        // Only the path is logged; the query may carry the token.
        debug!("{} {} with {} params", method, url, params.len());

        let http_method = match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut builder = self
            .client
            .request(http_method, &url)
            .headers(Self::default_headers())
            .query(&self.query_with_auth(params));
        if self.auth == AuthMode::Header {
            builder = builder.bearer_auth(&self.access_token);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            // reqwest includes the URL (and thus the token) in its Display output.
            let e = e.without_url();
            warn!("Request {} {} failed: {}", method, url, e);
            FetcherError::NetworkError(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            let e = e.without_url();
            warn!("Failed to read response body from {}: {}", url, e);
            FetcherError::NetworkError(e.to_string())
        })?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate limit error (429) on {} {}", method, url);
            return Err(FetcherError::RateLimitError(format!(
                "{} {}: {}",
                status,
                url,
                preview(&text)
            )));
        }

        if !status.is_success() {
            error!("{} {} returned {}", method, url, status);
            return Err(FetcherError::HttpError(format!(
                "{} {}: {}",
                status,
                url,
                preview(&text)
            )));
        }

        serde_json::from_str::<T>(&text).map_err(|e| {
            error!("Failed to parse response from {}: {}", url, e);
            FetcherError::ParseError(format!("{e}. Response: {}", preview(&text)))
        })
    }
}

/// First characters of a response body, for error messages
fn preview(body: &str) -> String {
    if body.chars().count() <= ERROR_BODY_PREVIEW {
        return body.to_string();
    }
    let head: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
    format!("{head}...")
}
