//! Request throttling
//!
//! Every outbound call passes through [`RateLimiter::acquire`] first. Two
//! strategies are available:
//! - fixed delay: sleep the whole delay before every call, regardless of how
//!   long the previous call took
//! - minimum interval: remember when the previous call started and sleep only
//!   what is left of the delay
//!
//! Either way no two calls start less than the delay apart.

use crate::clock::SharedClock;
use crate::config::ThrottleMode;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Throttle shared by every request of one export
pub struct RateLimiter {
    limiter_type: RateLimiterType,
    clock: SharedClock,
    last_call: Mutex<Option<Instant>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RateLimiterType {
    FixedDelay { delay: Duration },
    MinInterval { interval: Duration },
}

impl RateLimiter {
    /// Sleep `delay` before every call
    pub fn fixed_delay(delay: Duration, clock: SharedClock) -> Self {
        Self {
            limiter_type: RateLimiterType::FixedDelay { delay },
            clock,
            last_call: Mutex::new(None),
        }
    }

    /// Keep call starts at least `interval` apart
    pub fn min_interval(interval: Duration, clock: SharedClock) -> Self {
        Self {
            limiter_type: RateLimiterType::MinInterval { interval },
            clock,
            last_call: Mutex::new(None),
        }
    }

    /// Build the limiter matching a configured throttle mode
    pub fn from_mode(mode: ThrottleMode, delay: Duration, clock: SharedClock) -> Self {
        match mode {
            ThrottleMode::Fixed => Self::fixed_delay(delay, clock),
            ThrottleMode::Interval => Self::min_interval(delay, clock),
        }
    }

    /// Check if this is a fixed-delay limiter
    pub fn is_fixed_delay(&self) -> bool {
        matches!(self.limiter_type, RateLimiterType::FixedDelay { .. })
    }

    /// Wait until the next call may start
    ///
    /// # Returns
    /// How long the caller was suspended
    pub async fn acquire(&self) -> Duration {
        let wait = match self.limiter_type {
            RateLimiterType::FixedDelay { delay } => delay,
            RateLimiterType::MinInterval { interval } => {
                let now = self.clock.now();
                match *self.lock_last_call() {
                    Some(last) => interval.saturating_sub(now.saturating_duration_since(last)),
                    None => Duration::ZERO,
                }
            }
        };

        if !wait.is_zero() {
            debug!("Throttling next request for {:?}", wait);
            self.clock.sleep(wait).await;
        }

        *self.lock_last_call() = Some(self.clock.now());
        wait
    }

    /// Start instant of the most recent call, if any
    pub fn last_call(&self) -> Option<Instant> {
        *self.lock_last_call()
    }

    fn lock_last_call(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.last_call.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limiter_type", &self.limiter_type)
            .field("last_call", &self.last_call())
            .finish()
    }
}
