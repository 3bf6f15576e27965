//! Exponential retry delay with a ceiling.

use std::cmp;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Delay to wait after the failed attempt numbered `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let delay = self.base.checked_mul(factor).unwrap_or(self.max);
        cmp::min(delay, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_from_base() {
        let backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(60));
        assert_eq!(backoff.delay(0), Duration::from_secs(1));
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(4), Duration::from_secs(16));
    }

    #[test]
    fn never_exceeds_cap() {
        let backoff = Backoff::new(Duration::from_millis(250), Duration::from_secs(5));
        for attempt in 0..80 {
            assert!(backoff.delay(attempt) <= Duration::from_secs(5));
        }
        assert_eq!(backoff.delay(40), Duration::from_secs(5));
    }

    #[test]
    fn huge_base_saturates_to_cap() {
        let backoff = Backoff::new(Duration::MAX, Duration::from_secs(30));
        assert_eq!(backoff.delay(3), Duration::from_secs(30));
    }
}
