//! Batch export constants

use std::time::Duration;

/// Delay applied before every outbound API call.
/// Ecwid allows roughly 600 requests per minute per token; one per second
/// stays far below that even with other integrations sharing the token.
pub const REQUEST_DELAY_MS: u64 = 1000;

/// Delay between two status polls of the same batch ticket.
pub const POLL_DELAY_MS: u64 = 4000;

/// Wall-clock bound for polling a single ticket (5 minutes).
pub const POLL_TIME_LIMIT_MS: u64 = 300_000;

/// Items per page; the API's maximum `limit`.
pub const PAGE_SIZE: u64 = 100;

/// Items per batch request. Ten pages make one thousand-block.
pub const BLOCK_SIZE: u64 = 1000;

/// Default API base. Store id and resource path are appended to it.
pub const DEFAULT_API_URL: &str = "https://app.ecwid.com/api/v3/";

/// HTTP connect timeout (seconds)
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (seconds)
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timing knobs of one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTiming {
    /// Throttle delay before each API call
    pub request_delay: Duration,
    /// Delay between ticket polls
    pub poll_delay: Duration,
    /// Maximum time spent polling one ticket
    pub poll_time_limit: Duration,
}

impl Default for ExportTiming {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(REQUEST_DELAY_MS),
            poll_delay: Duration::from_millis(POLL_DELAY_MS),
            poll_time_limit: Duration::from_millis(POLL_TIME_LIMIT_MS),
        }
    }
}
