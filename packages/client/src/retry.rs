use std::time::Duration;

use playhub::PlayResult;
use tracing::warn;

use crate::clock::Clock;

/// Exponential backoff for transient read failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the
/// attempts run out.
pub fn retry_transient<T>(
    clock: &dyn Clock,
    policy: &RetryPolicy,
    label: &str,
    mut op: impl FnMut() -> PlayResult<T>,
) -> PlayResult<T> {
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} failed on attempt {}/{}: {}; retrying in {:?}",
                    label, attempt, policy.max_attempts, error, delay
                );
                clock.sleep(delay);
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
