//! Reconnect backoff.
//!
//! - [`BackoffConfig`]: attempt budget and delay bounds
//! - [`reconnect_delay_ms`]: `min(base * 2^attempt, max)`
//! - [`ReconnectBackoff`]: the attempt counter a connection owns
//!
//! There is no jitter. Delays are exact so callers and tests can predict
//! the schedule.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of automatic reconnect attempts.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
/// Default delay cap in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// Reconnect parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackoffConfig {
    /// Attempts allowed before automatic reconnection stops.
    pub max_attempts: u32,
    /// Delay before the first attempt.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

/// Delay before reconnect attempt `attempt` (zero-based).
#[must_use]
pub fn reconnect_delay_ms(attempt: u32, base_delay_ms: u64, max_delay_ms: u64) -> u64 {
    base_delay_ms
        .saturating_mul(1u64 << attempt.min(31))
        .min(max_delay_ms)
}

/// Attempt counter for one connection.
///
/// Reset on every successful open, advanced on every close or failed
/// automatic attempt, forced to the budget by an explicit disconnect.
#[derive(Clone, Debug)]
pub struct ReconnectBackoff {
    config: BackoffConfig,
    attempts: u32,
}

impl ReconnectBackoff {
    /// Fresh counter at zero.
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    /// Attempts consumed since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The configuration in effect.
    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Whether the budget is spent.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.config.max_attempts
    }

    /// Back to zero after a successful open.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Spend the whole budget so no further attempt is scheduled.
    pub fn exhaust(&mut self) {
        self.attempts = self.config.max_attempts;
    }

    /// Consume one attempt and return its delay, or `None` once exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        let delay = reconnect_delay_ms(
            self.attempts,
            self.config.base_delay_ms,
            self.config.max_delay_ms,
        );
        self.attempts += 1;
        Some(Duration::from_millis(delay))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -- reconnect_delay_ms --

    #[test]
    fn delay_doubles_from_base() {
        assert_eq!(reconnect_delay_ms(0, 1000, 30_000), 1000);
        assert_eq!(reconnect_delay_ms(1, 1000, 30_000), 2000);
        assert_eq!(reconnect_delay_ms(2, 1000, 30_000), 4000);
        assert_eq!(reconnect_delay_ms(3, 1000, 30_000), 8000);
        assert_eq!(reconnect_delay_ms(4, 1000, 30_000), 16_000);
        assert_eq!(reconnect_delay_ms(5, 1000, 30_000), 30_000);
    }

    #[test]
    fn delay_high_attempt_no_overflow() {
        assert_eq!(reconnect_delay_ms(u32::MAX, 1000, 30_000), 30_000);
        assert_eq!(reconnect_delay_ms(63, u64::MAX, u64::MAX), u64::MAX);
    }

    proptest! {
        #[test]
        fn delay_matches_formula(n in 0u32..=DEFAULT_MAX_RECONNECT_ATTEMPTS) {
            let expected = (1000u64 * 2u64.pow(n)).min(30_000);
            prop_assert_eq!(reconnect_delay_ms(n, 1000, 30_000), expected);
        }

        #[test]
        fn delay_never_exceeds_cap(n in 0u32..64, base in 1u64..10_000, cap in 1u64..1_000_000) {
            prop_assert!(reconnect_delay_ms(n, base, cap) <= cap);
        }
    }

    // -- ReconnectBackoff --

    #[test]
    fn budget_of_five_then_none() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig::default());
        let delays: Vec<u64> = std::iter::from_fn(|| backoff.next_delay())
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16_000]);
        assert!(backoff.is_exhausted());
        assert!(backoff.next_delay().is_none());
    }

    #[test]
    fn fourth_attempt_waits_eight_seconds() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig::default());
        for _ in 0..3 {
            let _ = backoff.next_delay();
        }
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(8000)));
    }

    #[test]
    fn reset_restores_budget() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig::default());
        let _ = backoff.next_delay();
        let _ = backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn exhaust_suppresses_scheduling() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig::default());
        backoff.exhaust();
        assert_eq!(backoff.attempts(), 5);
        assert!(backoff.next_delay().is_none());
    }

    #[test]
    fn zero_budget_never_schedules() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig {
            max_attempts: 0,
            ..BackoffConfig::default()
        });
        assert!(backoff.next_delay().is_none());
    }

    #[test]
    fn config_serde_camel_case() {
        let json = serde_json::to_value(BackoffConfig::default()).unwrap();
        assert_eq!(json["maxAttempts"], 5);
        assert_eq!(json["baseDelayMs"], 1000);
        assert_eq!(json["maxDelayMs"], 30_000);
    }
}
