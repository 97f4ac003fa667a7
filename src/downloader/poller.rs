//! Batch ticket polling
//!
//! Polling is a two-state machine:
//!
//! ```text
//!            poll               status == COMPLETED
//!  start ─────────► Pending ─────────────────────────► Completed
//!                    │   ▲
//!                    └───┘ elapsed <= limit: wait, poll again
//!                    │
//!                    └──────► TimedOut (elapsed > limit)
//! ```
//!
//! The clock starts right after the first poll. The elapsed check happens
//! before each wait, so a ticket that completes on the last poll inside the
//! bound is still returned.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clock::SharedClock;
use crate::downloader::{DownloadError, DownloadResult};
use crate::fetcher::StoreApi;
use crate::{BatchResult, BatchStatus, Ticket};

/// Observable state of a poll loop
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    /// Last poll reported a non-terminal status
    Pending {
        /// Status of the last poll
        status: BatchStatus,
        /// Polls issued so far
        attempts: u32,
    },
    /// Terminal
    Completed {
        /// Polls issued in total
        attempts: u32,
    },
}

/// Polls a ticket until it completes or the time limit is exceeded
pub struct BatchPoller {
    api: Arc<dyn StoreApi>,
    clock: SharedClock,
    poll_delay: Duration,
    time_limit: Duration,
}

impl BatchPoller {
    /// Create a poller
    ///
    /// # Arguments
    /// * `api` - Store API used for status requests
    /// * `clock` - Time source for waits and the elapsed check
    /// * `poll_delay` - Wait between polls
    /// * `time_limit` - Bound on the time spent polling one ticket
    pub fn new(
        api: Arc<dyn StoreApi>,
        clock: SharedClock,
        poll_delay: Duration,
        time_limit: Duration,
    ) -> Self {
        Self {
            api,
            clock,
            poll_delay,
            time_limit,
        }
    }

    /// Poll `ticket` until its status is `COMPLETED`
    ///
    /// # Errors
    /// - `BatchTimeout` once more than the time limit has passed since the
    ///   first poll without completion
    /// - any fetcher error from a status request, unretried
    pub async fn poll_until_complete(&self, ticket: &Ticket) -> DownloadResult<BatchResult> {
        let mut result = self.api.batch_status(ticket).await?;
        let start = self.clock.now();
        let mut state = Self::transition(&result, 1);

        loop {
            match state {
                PollState::Completed { attempts } => {
                    info!("Ticket {} completed after {} polls", ticket, attempts);
                    return Ok(result);
                }
                PollState::Pending { status, attempts } => {
                    let elapsed = self.clock.now().saturating_duration_since(start);
                    if elapsed > self.time_limit {
                        warn!(
                            "Ticket {} still {} after {:?}, giving up",
                            ticket, status, elapsed
                        );
                        return Err(DownloadError::BatchTimeout {
                            ticket: ticket.to_string(),
                            elapsed,
                        });
                    }

                    debug!(
                        "Ticket {} is {} (poll {}), waiting {:?}",
                        ticket, status, attempts, self.poll_delay
                    );
                    self.clock.sleep(self.poll_delay).await;

                    result = self.api.batch_status(ticket).await?;
                    state = Self::transition(&result, attempts + 1);
                }
            }
        }
    }

    fn transition(result: &BatchResult, attempts: u32) -> PollState {
        if result.is_completed() {
            PollState::Completed { attempts }
        } else {
            PollState::Pending {
                status: result.status().clone(),
                attempts,
            }
        }
    }
}
