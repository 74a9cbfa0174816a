use std::time::Duration;

/// Doubling retry delay for forecast fetches, capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    base: Duration,
    max: Duration,
}

impl Backoff {
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.min(max);
        Self {
            current: base,
            base,
            max,
        }
    }

    /// Default schedule for the forecast fetcher: 10 s doubling up to 5 min.
    #[must_use]
    pub fn for_fetch() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(300))
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn doubles_until_capped() {
        let mut backoff = Backoff::new(secs(10), secs(60));
        assert_eq!(backoff.next_delay(), secs(10));
        assert_eq!(backoff.next_delay(), secs(20));
        assert_eq!(backoff.next_delay(), secs(40));
        assert_eq!(backoff.next_delay(), secs(60));
        assert_eq!(backoff.next_delay(), secs(60));
    }

    #[test]
    fn reset_returns_to_base() {
        let mut backoff = Backoff::for_fetch();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), secs(10));
    }

    #[test]
    fn base_larger_than_max_is_capped() {
        let mut backoff = Backoff::new(secs(500), secs(300));
        assert_eq!(backoff.next_delay(), secs(300));
    }
}
