//! Rate limiting primitives for auth flows.
//!
//! Fixed-window counters: the first request for a key (or the first after
//! the window elapses) re-arms the window; once the count reaches the limit
//! further requests are rejected without incrementing. A burst straddling a
//! window boundary can admit up to twice the limit; that is the accepted
//! fixed-window approximation, covered by a test rather than fixed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    /// Decide whether one more request for `key` fits within `limit` per
    /// `window`, counting it if so.
    fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitDecision;

    /// Drop counters whose window has elapsed. Advisory: correctness never
    /// depends on it, entries also reset lazily on access.
    fn sweep(&self) {}
}

#[derive(Debug)]
struct RateLimitEntry {
    count: u32,
    reset_at: Instant,
}

/// In-memory fixed-window limiter. Each check is a single critical section
/// so threshold crossings stay exact under concurrent requests.
#[derive(Debug, Default)]
pub struct FixedWindowRateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl FixedWindowRateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitDecision {
        let now = Instant::now();
        // A poisoned lock degrades to permissive rather than failing the request.
        let Ok(mut entries) = self.entries.lock() else {
            return RateLimitDecision::Allowed;
        };

        match entries.get_mut(key) {
            Some(entry) if now < entry.reset_at => {
                if entry.count >= limit {
                    return RateLimitDecision::Limited;
                }
                entry.count += 1;
                RateLimitDecision::Allowed
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    RateLimitEntry {
                        count: 1,
                        reset_at: now + window,
                    },
                );
                RateLimitDecision::Allowed
            }
        }
    }

    fn sweep(&self) {
        let now = Instant::now();
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, entry| now < entry.reset_at);
        }
    }
}

/// Limiter that admits everything; used by tests that exercise flows
/// unrelated to rate limiting.
#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check(&self, _key: &str, _limit: u32, _window: Duration) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(900);

    #[test]
    fn allows_up_to_limit() {
        let limiter = FixedWindowRateLimiter::new();
        for _ in 0..10 {
            assert_eq!(
                limiter.check("login:1.2.3.4", 10, WINDOW),
                RateLimitDecision::Allowed
            );
        }
    }

    #[test]
    fn eleventh_request_is_limited() {
        let limiter = FixedWindowRateLimiter::new();
        for _ in 0..10 {
            limiter.check("login:1.2.3.4", 10, WINDOW);
        }
        assert_eq!(
            limiter.check("login:1.2.3.4", 10, WINDOW),
            RateLimitDecision::Limited
        );
        // Rejections do not consume budget; still limited, not further along.
        assert_eq!(
            limiter.check("login:1.2.3.4", 10, WINDOW),
            RateLimitDecision::Limited
        );
    }

    #[test]
    fn keys_are_independent() {
        let limiter = FixedWindowRateLimiter::new();
        for _ in 0..10 {
            limiter.check("login:1.2.3.4", 10, WINDOW);
        }
        assert_eq!(
            limiter.check("login:5.6.7.8", 10, WINDOW),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            limiter.check("register:1.2.3.4", 5, WINDOW),
            RateLimitDecision::Allowed
        );
    }

    #[test]
    fn window_expiry_re_arms_the_counter() {
        let limiter = FixedWindowRateLimiter::new();
        let window = Duration::from_millis(30);
        for _ in 0..3 {
            limiter.check("k", 3, window);
        }
        assert_eq!(limiter.check("k", 3, window), RateLimitDecision::Limited);

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(limiter.check("k", 3, window), RateLimitDecision::Allowed);
    }

    #[test]
    fn fixed_window_admits_second_burst_after_boundary() {
        // Documented fixed-window behavior: a full burst right before the
        // boundary plus a full burst right after admits 2x the limit.
        let limiter = FixedWindowRateLimiter::new();
        let window = Duration::from_millis(30);
        for _ in 0..5 {
            assert_eq!(limiter.check("k", 5, window), RateLimitDecision::Allowed);
        }
        std::thread::sleep(Duration::from_millis(40));
        for _ in 0..5 {
            assert_eq!(limiter.check("k", 5, window), RateLimitDecision::Allowed);
        }
    }

    #[test]
    fn sweep_purges_expired_entries_only() {
        let limiter = FixedWindowRateLimiter::new();
        limiter.check("stale", 5, Duration::from_millis(10));
        limiter.check("live", 5, Duration::from_secs(60));

        std::thread::sleep(Duration::from_millis(20));
        limiter.sweep();

        let entries = limiter.entries.lock().expect("lock");
        assert!(!entries.contains_key("stale"));
        assert!(entries.contains_key("live"));
    }

    #[test]
    fn noop_rate_limiter_allows() {
        let limiter = NoopRateLimiter;
        assert_eq!(
            limiter.check("login:1.2.3.4", 0, WINDOW),
            RateLimitDecision::Allowed
        );
    }
}
