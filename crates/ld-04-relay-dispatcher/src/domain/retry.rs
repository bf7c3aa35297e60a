//! # Retry Policy
//!
//! Bounded exponential backoff for transient ledger failures.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempt ceiling, including the first attempt.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Growth factor per attempt.
    pub multiplier: u32,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Deadline for one submission.
    pub attempt_timeout: Duration,
    /// Fraction of the delay randomized in either direction, `0.0..=1.0`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(200),
            multiplier: 2,
            max_delay: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(10),
            jitter: 0.0,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        let factor = self.multiplier.max(1).saturating_pow(exp);
        let delay = self
            .base_delay
            .saturating_mul(factor)
            .min(self.max_delay);

        if self.jitter <= 0.0 {
            return delay;
        }
        let jitter = self.jitter.min(1.0);
        let scale = rand::thread_rng().gen_range((1.0 - jitter)..=(1.0 + jitter));
        delay.mul_f64(scale).min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempt` attempts.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
