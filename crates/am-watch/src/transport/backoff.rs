use std::time::Duration;

/// First reconnect delay, in seconds.
pub const INITIAL_DELAY_SECS: f64 = 1.0;
/// Reconnect delay ceiling, in seconds.
pub const MAX_DELAY_SECS: f64 = 30.0;
/// Growth factor per consecutive failure.
const MULTIPLIER: f64 = 1.5;

/// Exponential reconnect backoff: 1.0s, 1.5s, 2.25s, ... capped at 30s,
/// reset to 1.0s on a successful connection.
#[derive(Debug)]
pub struct Backoff {
    delay_secs: f64,
}

impl Backoff {
    pub fn new() -> Self {
        Self {
            delay_secs: INITIAL_DELAY_SECS,
        }
    }

    /// Delay to sleep for this failure; advances the next delay.
    pub fn next(&mut self) -> Duration {
        let current = self.delay_secs;
        self.delay_secs = (self.delay_secs * MULTIPLIER).min(MAX_DELAY_SECS);
        Duration::from_secs_f64(current)
    }

    /// Back to the initial delay after a successful (re)connection.
    pub fn reset(&mut self) {
        self.delay_secs = INITIAL_DELAY_SECS;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_by_half_per_failure() {
        let mut backoff = Backoff::new();
        assert_eq!(backoff.next(), Duration::from_secs_f64(1.0));
        assert_eq!(backoff.next(), Duration::from_secs_f64(1.5));
        assert_eq!(backoff.next(), Duration::from_secs_f64(2.25));
    }

    #[test]
    fn caps_at_thirty_seconds() {
        let mut backoff = Backoff::new();
        for _ in 0..32 {
            backoff.next();
        }
        assert_eq!(backoff.next(), Duration::from_secs_f64(MAX_DELAY_SECS));
    }

    #[test]
    fn reset_restores_initial_delay() {
        let mut backoff = Backoff::new();
        backoff.next();
        backoff.next();
        backoff.reset();
        assert_eq!(backoff.next(), Duration::from_secs_f64(1.0));
    }
}
