//! Retry classification and exponential backoff for lookups.

use crate::config::RetryConfig;
use crate::error::{LookupError, LookupErrorKind};
use std::time::Duration;

/// Attempts per query, first call included
pub const MAX_ATTEMPTS: u32 = 3;

const RETRYABLE_MARKERS: [&str; 9] = [
    "rate limit",
    "timeout",
    "timed out",
    "network",
    "econnreset",
    "econnrefused",
    "500",
    "502",
    "503",
];

/// Whether a failed lookup may succeed if repeated.
///
/// Timeouts, network failures, rate limiting and 5xx responses are transient.
/// 4xx responses are not. Unclassified errors fall back to message inspection.
pub fn is_retryable(error: &LookupError) -> bool {
    match error.kind {
        LookupErrorKind::Timeout
        | LookupErrorKind::Network
        | LookupErrorKind::RateLimited
        | LookupErrorKind::Server(_) => true,
        LookupErrorKind::Client(_) => false,
        LookupErrorKind::Other => {
            let message = error.message.to_lowercase();
            RETRYABLE_MARKERS
                .iter()
                .any(|marker| message.contains(marker))
        }
    }
}

/// Backoff schedule between attempts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            multiplier: config.multiplier.max(1.0),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Delay after the `failed_attempt`-th failure (1-based): initial * multiplier^(n-1), capped.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1) as i32;
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }
}
