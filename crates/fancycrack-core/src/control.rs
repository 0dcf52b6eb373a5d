//! Cross-thread controls: cancellation and per-attempt throttle

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Upper bound for the per-attempt delay
pub const MAX_DELAY_MS: u64 = 1000;

const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the search to stop at the next candidate boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Delay applied after every attempt, last writer wins
#[derive(Debug, Clone, Default)]
pub struct Throttle {
    delay_ms: Arc<AtomicU64>,
}

impl Throttle {
    pub fn new(delay_ms: u64) -> Self {
        let throttle = Self::default();
        throttle.set_delay_ms(delay_ms);
        throttle
    }

    /// Set the delay, clamped to `0..=MAX_DELAY_MS`
    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.delay_ms
            .store(delay_ms.min(MAX_DELAY_MS), Ordering::Relaxed);
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms.load(Ordering::Relaxed)
    }

    /// Sleep for the current delay, waking early if `token` is cancelled
    pub fn pause(&self, token: &CancellationToken) {
        let mut remaining = Duration::from_millis(self.delay_ms());
        while !remaining.is_zero() && !token.is_cancelled() {
            let step = remaining.min(SLEEP_SLICE);
            thread::sleep(step);
            remaining -= step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_delay_clamped() {
        let throttle = Throttle::new(5000);
        assert_eq!(throttle.delay_ms(), MAX_DELAY_MS);
        throttle.set_delay_ms(25);
        assert_eq!(throttle.clone().delay_ms(), 25);
    }

    #[test]
    fn test_pause_zero_returns_immediately() {
        let start = Instant::now();
        Throttle::new(0).pause(&CancellationToken::new());
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_pause_cut_short_by_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        let start = Instant::now();
        Throttle::new(1000).pause(&token);
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_pause_sleeps() {
        let start = Instant::now();
        Throttle::new(30).pause(&CancellationToken::new());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
