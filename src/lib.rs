//! # Ecwid Data Downloader Library
//!
//! Exports every item of an Ecwid REST API resource (products, orders,
//! customers, ...) into a single local JSON file, using the platform's
//! asynchronous batch endpoint instead of hundreds of individual page requests.
//!
//! ## Features
//!
//! - **Batch Export**: Pages of 100 items are grouped into thousand-item blocks and
//!   submitted as one batch request each
//! - **Polling**: Each batch ticket is polled until the platform reports `COMPLETED`,
//!   bounded by a wall-clock limit
//! - **Rate Limiting**: Every outbound call is throttled to respect the API quota
//! - **Deterministic Time**: Throttle and poll waits go through an injectable [`clock::Clock`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use ecwid_data_downloader::config::ExportConfig;
//! use ecwid_data_downloader::downloader::ExportExecutor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExportConfig::new("1003", "secret_token", "products")?;
//! let executor = ExportExecutor::from_config(&config)?;
//! let summary = executor.execute().await?;
//! println!("saved {} blocks to {}", summary.blocks, summary.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Export configuration resolved once at startup
//! - [`clock`] - Time source used by the throttle and the poller
//! - [`fetcher`] - Ecwid HTTP client and the [`fetcher::StoreApi`] seam
//! - [`downloader`] - Offset planning, batch polling and the export pipeline
//! - [`output`] - JSON result writer
//! - [`cli`] - Command line surface

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// CLI command implementation
pub mod cli;

/// Time source abstraction
pub mod clock;

/// Export configuration
pub mod config;

/// Export orchestration
pub mod downloader;

/// Remote API access
pub mod fetcher;

/// Result writers
pub mod output;

pub use config::ExportConfig;

/// HTTP method of a request, as it appears inside a batch payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
}

impl HttpMethod {
    /// Uppercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One 100-item page inside a batch request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Store identifier
    pub id: String,
    /// Resource path including the offset query, e.g. `/products?offset=300`
    pub path: String,
    /// Always GET for exported pages
    pub method: HttpMethod,
    /// Always empty for exported pages
    pub body: String,
}

impl PageRequest {
    /// Build the GET descriptor for the page starting at `offset`
    pub fn get(store_id: &str, resource: &str, offset: u64) -> Self {
        Self {
            id: store_id.to_string(),
            path: format!("/{resource}?offset={offset}"),
            method: HttpMethod::Get,
            body: String::new(),
        }
    }
}

/// Opaque handle for a submitted batch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(String);

impl Ticket {
    /// Wrap a ticket string returned by the batch endpoint
    pub fn new(ticket: impl Into<String>) -> Self {
        Self(ticket.into())
    }

    /// Raw ticket value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported by the batch status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BatchStatus {
    /// Accepted but not started
    Queued,
    /// Being processed
    InProgress,
    /// Terminal: every page payload is available
    Completed,
    /// Any other value the platform reports; treated as still pending
    Other(String),
}

impl BatchStatus {
    /// Whether this is the terminal `COMPLETED` state
    pub fn is_completed(&self) -> bool {
        matches!(self, BatchStatus::Completed)
    }
}

impl From<&str> for BatchStatus {
    fn from(s: &str) -> Self {
        match s {
            "QUEUED" => BatchStatus::Queued,
            "IN_PROGRESS" => BatchStatus::InProgress,
            "COMPLETED" => BatchStatus::Completed,
            other => BatchStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchStatus::Queued => "QUEUED",
            BatchStatus::InProgress => "IN_PROGRESS",
            BatchStatus::Completed => "COMPLETED",
            BatchStatus::Other(s) => s.as_str(),
        };
        write!(f, "{s}")
    }
}

/// A batch status response
///
/// The response body is kept verbatim so the exported file contains exactly
/// what the platform returned; only `status` is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    status: BatchStatus,
    body: Value,
}

impl BatchResult {
    /// Parse a status response, requiring a string `status` field
    pub fn from_value(body: Value) -> Result<Self, String> {
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .map(BatchStatus::from)
            .ok_or_else(|| format!("batch response has no status field: {body}"))?;
        Ok(Self { status, body })
    }

    /// Reported status
    pub fn status(&self) -> &BatchStatus {
        &self.status
    }

    /// Whether the batch finished
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Full response body
    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}
