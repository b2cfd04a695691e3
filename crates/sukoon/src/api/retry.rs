//! Backoff policy and error classification for model calls.
//!
//! Errors are classified by the `HTTP nnn` status the chat client writes
//! into its error strings. 408, 429 and the 5xx gateway statuses are
//! retried; 400, 401, 403, 404 and 422 never are. An error without a status
//! is transient only when it looks like a connection-level failure.

use std::time::Duration;

/// Fractional part of the golden ratio. Stepping by it spreads successive
/// jitter factors evenly over `0..1` without a random source.
const GOLDEN_FRACTION: f64 = 0.618_033_988_749_895;

const TRANSIENT_STATUSES: &[u16] = &[408, 429, 500, 502, 503, 504];
const PERMANENT_STATUSES: &[u16] = &[400, 401, 403, 404, 422];

const TRANSIENT_PATTERNS: &[&str] = &[
    "request failed:",
    "connection reset",
    "connection refused",
    "broken pipe",
    "timed out",
];

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt. `0` fails on the first error.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each one after.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Share of each delay that jitter may remove, clamped to `0.0..=1.0`.
    pub jitter_ratio: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_ratio: 0.25,
        }
    }
}

impl RetryConfig {
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_retries: retries,
            ..Default::default()
        }
    }

    /// Total attempts including the first call.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Sleep before retry number `retry` (0 for the first retry).
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let doubled = self.base_delay.saturating_mul(1 << retry.min(16));
        let capped = doubled.min(self.max_delay);
        let spread = (f64::from(retry) * GOLDEN_FRACTION).fract();
        capped.mul_f64(1.0 - self.jitter_ratio.clamp(0.0, 1.0) * spread)
    }
}

/// The three-digit status following `HTTP ` in an error string.
fn http_status(error: &str) -> Option<u16> {
    let (_, rest) = error.split_once("HTTP ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.len() == 3 {
        digits.parse().ok()
    } else {
        None
    }
}

/// Whether a model call error is worth retrying.
pub fn is_transient_error(error: &str) -> bool {
    match http_status(error) {
        Some(status) => TRANSIENT_STATUSES.contains(&status),
        None => {
            let lower = error.to_lowercase();
            TRANSIENT_PATTERNS.iter().any(|p| lower.contains(p))
        }
    }
}

/// Whether a model call error carries a status that must not be retried.
pub fn is_permanent_error(error: &str) -> bool {
    http_status(error).is_some_and(|status| PERMANENT_STATUSES.contains(&status))
}
