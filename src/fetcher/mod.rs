//! Remote API access
//!
//! [`StoreApi`] is the seam between the export pipeline and the platform: the
//! pipeline only needs the item total, batch submission and batch status.
//! [`ecwid::EcwidFetcher`] implements it over HTTP; tests substitute scripted
//! fakes.

use crate::{BatchResult, PageRequest, Ticket};
use async_trait::async_trait;

pub mod ecwid;
pub mod ecwid_http;

pub use ecwid::EcwidFetcher;
pub use ecwid_http::EcwidHttpClient;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Store answered 429 Too Many Requests
    #[error("rate limit exceeded: {0}")]
    RateLimitError(String),

    /// Response body could not be decoded
    #[error("parse error: {0}")]
    ParseError(String),

    /// Response decoded but a required field is missing or malformed
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Transport failure (connect, timeout, TLS)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Request could not be built
    #[error("request error: {0}")]
    RequestError(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Operations the export pipeline performs against the store
#[async_trait]
pub trait StoreApi: Send + Sync {
    /// Total number of items of `resource`
    ///
    /// Issues `GET {resource}?limit=1` and reads `total`.
    async fn total(&self, resource: &str) -> FetcherResult<u64>;

    /// Submit one batch of page requests
    ///
    /// POSTs the JSON array of descriptors to `batch` and returns its `ticket`.
    async fn submit_batch(&self, pages: &[PageRequest]) -> FetcherResult<Ticket>;

    /// Current state of a submitted batch (`GET batch?ticket=...`)
    async fn batch_status(&self, ticket: &Ticket) -> FetcherResult<BatchResult>;
}
