//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Delay schedule between attempts.
///
/// `delay(n) = min(base * 2^n, max) + uniform(0, jitter)`, where `n` is the
/// number of attempts already made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
    pub jitter: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            max: Duration::from_millis(2000),
            jitter: Duration::from_millis(100),
        }
    }
}

impl BackoffPolicy {
    /// Delay before the next attempt, after `attempts` attempts.
    pub fn delay(&self, attempts: u32) -> Duration {
        self.delay_with_rng(attempts, &mut rand::thread_rng())
    }

    pub fn delay_with_rng<R: Rng + ?Sized>(&self, attempts: u32, rng: &mut R) -> Duration {
        let base_ms = self.base.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;

        let exponential = 2u64.saturating_pow(attempts);
        let capped = base_ms.saturating_mul(exponential).min(max_ms);

        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms > 0 {
            rng.gen_range(0..jitter_ms)
        } else {
            0
        };

        Duration::from_millis(capped + jitter)
    }
}
