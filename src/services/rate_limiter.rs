//! Fixed-window rate limiter.
//!
//! A soft operational guard, independent of billing quota: exceeding it
//! returns HTTP 429 on the metered endpoint but never touches credit
//! accounting. State lives in process memory and resets on restart -
//! acceptable for a throttle, documented limitation, not a correctness
//! bug for this system's purpose.
//!
//! The limiter is an injectable component (constructed once at startup,
//! shared via application state) rather than a process-global map, and
//! reads time through a [`Clock`] so tests can drive the window
//! deterministically.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Time source for the limiter. Production uses [`SystemClock`]; tests
/// inject a manual clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock implementation backed by `Instant::now`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Per-identity window state: when the window opened and how many
/// requests it has admitted.
struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window request throttle keyed by identity (project id).
///
/// # Semantics
///
/// - First request for an identity opens a new window with count 1
/// - Requests within a live window increment the count until `max_requests`
/// - Once the window age exceeds `window`, the next request resets
///   count to 1 and restarts the window (fixed window, not sliding)
pub struct RateLimiter {
    windows: Mutex<HashMap<i64, Window>>,
    max_requests: u32,
    window: Duration,
    clock: Box<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter with the given window size and per-window cap,
    /// using the system clock.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Box::new(SystemClock))
    }

    /// Create a limiter with an injected clock (used by tests).
    pub fn with_clock(max_requests: u32, window: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
            clock,
        }
    }

    /// Check whether a request from `identity` is admitted.
    ///
    /// Mutates the identity's window under a single lock, so the
    /// check-and-increment is atomic per identity. Cross-process
    /// coordination is out of scope.
    pub fn allow(&self, identity: i64) -> bool {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        match windows.get_mut(&identity) {
            Some(window) => {
                // Window expired: restart with this request as the first
                if now.duration_since(window.started_at) >= self.window {
                    window.started_at = now;
                    window.count = 1;
                    return true;
                }

                if window.count >= self.max_requests {
                    return false;
                }

                window.count += 1;
                true
            }
            None => {
                windows.insert(
                    identity,
                    Window {
                        started_at: now,
                        count: 1,
                    },
                );
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Clock advanced manually by tests, so window rollover is exact.
    struct ManualClock {
        base: Instant,
        offset_ms: Arc<AtomicU64>,
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
        }
    }

    fn limiter_with_manual_clock(max: u32, window_secs: u64) -> (RateLimiter, Arc<AtomicU64>) {
        let offset = Arc::new(AtomicU64::new(0));
        let clock = ManualClock {
            base: Instant::now(),
            offset_ms: offset.clone(),
        };
        let limiter = RateLimiter::with_clock(
            max,
            Duration::from_secs(window_secs),
            Box::new(clock),
        );
        (limiter, offset)
    }

    #[test]
    fn admits_up_to_max_then_rejects() {
        let (limiter, _offset) = limiter_with_manual_clock(60, 60);

        for _ in 0..60 {
            assert!(limiter.allow(1));
        }
        // 61st request in the same window is rejected
        assert!(!limiter.allow(1));
        assert!(!limiter.allow(1));
    }

    #[test]
    fn window_rollover_resets_count() {
        let (limiter, offset) = limiter_with_manual_clock(60, 60);

        for _ in 0..60 {
            assert!(limiter.allow(7));
        }
        assert!(!limiter.allow(7));

        // Advance past the window: next call succeeds with a fresh count
        offset.store(60_001, Ordering::SeqCst);
        assert!(limiter.allow(7));

        // And the fresh window has its full budget again
        for _ in 0..59 {
            assert!(limiter.allow(7));
        }
        assert!(!limiter.allow(7));
    }

    #[test]
    fn identities_are_throttled_independently() {
        let (limiter, _offset) = limiter_with_manual_clock(2, 60);

        assert!(limiter.allow(1));
        assert!(limiter.allow(1));
        assert!(!limiter.allow(1));

        // A different identity still has its own budget
        assert!(limiter.allow(2));
    }

    #[test]
    fn request_inside_window_does_not_extend_it() {
        let (limiter, offset) = limiter_with_manual_clock(60, 60);

        assert!(limiter.allow(3));
        // Mid-window activity
        offset.store(30_000, Ordering::SeqCst);
        assert!(limiter.allow(3));

        // The window is measured from its start, not the last request:
        // 61 seconds after the first call it has rolled over
        offset.store(61_000, Ordering::SeqCst);
        for _ in 0..60 {
            assert!(limiter.allow(3));
        }
        assert!(!limiter.allow(3));
    }
}
