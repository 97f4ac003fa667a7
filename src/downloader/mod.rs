//! Export orchestration
//!
//! This module turns a resource name into a complete export:
//!
//! 1. **Count**: ask the store for the resource's item total
//! 2. **Plan**: derive descending page offsets grouped into thousand-blocks
//!    ([`planner::OffsetPlanner`])
//! 3. **Submit**: send each block as one batch request and keep its ticket
//! 4. **Poll**: wait for the ticket to complete ([`poller::BatchPoller`])
//! 5. **Write**: save every completed batch, in order, as one JSON array
//!
//! All requests are strictly sequential and throttled by
//! [`rate_limit::RateLimiter`].
//!
//! # Quick Start
//!
//! ```no_run
//! use ecwid_data_downloader::config::ExportConfig;
//! use ecwid_data_downloader::downloader::ExportExecutor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExportConfig::new("1003", "secret_token", "orders")?;
//! let summary = ExportExecutor::from_config(&config)?.execute().await?;
//! assert_eq!(summary.output_path.file_name().unwrap(), "orders.json");
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, DownloadError>`. Nothing is retried: a
//! failed request or a ticket that does not complete in time aborts the run
//! and no file is written.

use crate::fetcher::FetcherError;
use crate::output::OutputError;
use std::time::Duration;

pub mod config;
pub mod executor;
pub mod planner;
pub mod poller;
pub mod rate_limit;

pub use executor::{ExportExecutor, ExportSummary};
pub use planner::OffsetPlanner;
pub use poller::{BatchPoller, PollState};
pub use rate_limit::RateLimiter;

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Request to the store failed
    #[error("fetcher error: {0}")]
    Fetcher(#[from] FetcherError),

    /// Batch did not complete within the polling bound
    #[error("waiting time exceeded for batch ticket {ticket} after {elapsed:?}")]
    BatchTimeout {
        /// Ticket that was being polled
        ticket: String,
        /// Time spent polling
        elapsed: Duration,
    },

    /// Reported item total is too large to plan page offsets for
    #[error("item total {total} is out of range")]
    TotalOutOfRange {
        /// Total reported by the store
        total: u64,
    },

    /// Result file could not be written
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Result type for download operations
pub type DownloadResult<T> = Result<T, DownloadError>;
