// SPDX-License-Identifier: Apache-2.0

//! Retry policy for the authentication loop.
//!
//! The platform gives no token expiry, so a rejected token is simply
//! re-issued. Attempts are spaced by a constant backoff.

use std::time::Duration;

use backon::ConstantBuilder;

/// Default number of full login cycles before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between login cycles.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Determines if an HTTP status code is retryable.
///
/// Retryable status codes are:
/// - 429 (Too Many Requests / Rate Limited)
/// - 500 (Internal Server Error)
/// - 502 (Bad Gateway)
/// - 503 (Service Unavailable)
/// - 504 (Gateway Timeout)
#[must_use]
pub fn is_retryable_http(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Creates a constant backoff allowing `max_attempts` attempts in total.
///
/// `max_attempts` of zero is treated as one attempt.
#[must_use]
pub fn attempt_backoff(max_attempts: u32, delay: Duration) -> ConstantBuilder {
    let retries = usize::try_from(max_attempts.max(1) - 1).unwrap_or(usize::MAX);
    ConstantBuilder::default()
        .with_delay(delay)
        .with_max_times(retries)
}
