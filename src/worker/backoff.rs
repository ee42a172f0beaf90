//! Bounded exponential backoff with jitter for reconnect pacing.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Produces a bounded sequence of exponentially growing delays.
///
/// Delay for attempt `n` (1-based) is `base_interval * factor^(n-1)`, capped
/// at `max_interval`, then multiplied by a random jitter factor in
/// `[1 - jitter, 1 + jitter]`. After `max_attempts` delays the sequence is
/// exhausted and [`Backoff::next_delay`] returns `None` until a reset.
#[derive(Debug, Clone)]
pub struct Backoff {
    base_interval: Duration,
    max_interval: Duration,
    factor: f64,
    jitter: f64,
    max_attempts: u16,
    current_attempt: u16,
}

impl Backoff {
    pub fn new(
        base_interval: Duration,
        max_interval: Duration,
        factor: f64,
        jitter: f64,
        max_attempts: u16,
    ) -> Self {
        Self {
            base_interval,
            max_interval,
            factor,
            jitter,
            max_attempts,
            current_attempt: 0,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.base_interval,
            config.max_interval,
            config.factor,
            config.jitter,
            config.max_attempts,
        )
    }

    /// Next delay in the sequence, or `None` once all attempts are used up.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.current_attempt >= self.max_attempts {
            return None;
        }
        let exponent = self.factor.powi(i32::from(self.current_attempt));
        self.current_attempt += 1;

        // Cap before jittering, so a jittered delay can exceed the cap by at
        // most the jitter fraction.
        let capped = (self.base_interval.as_secs_f64() * exponent)
            .min(self.max_interval.as_secs_f64());
        let scale = rand::rng().random_range(1.0 - self.jitter..=1.0 + self.jitter);
        Some(Duration::from_secs_f64(capped * scale))
    }

    /// Restart the sequence from the first attempt.
    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }

    /// Number of delays handed out since the last reset.
    pub fn attempt(&self) -> u16 {
        self.current_attempt
    }

    pub fn max_attempts(&self) -> u16 {
        self.max_attempts
    }
}
