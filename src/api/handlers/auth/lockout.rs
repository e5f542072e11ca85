//! Account lockout tracking for login attempts.
//!
//! Per-identifier failed-attempt counters with a short timed lock: five
//! consecutive failures lock the identifier for sixty seconds. The lock is
//! keyed by the login identifier (handle), not the client address, so it is
//! a throttle against online guessing of one account, not a defense against
//! credential stuffing across identifiers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const MAX_FAILED_ATTEMPTS: u32 = 5;
const LOCKOUT_DURATION: Duration = Duration::from_secs(60);
// Entries whose lock expired this long ago are purged by the sweep.
const SWEEP_RETENTION: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct LockoutEntry {
    failed_attempts: u32,
    locked_until: Option<Instant>,
    last_attempt: Instant,
}

/// Lock status for one identifier. `remaining_seconds` is the ceiling of
/// the remaining lock time and is only present while locked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockStatus {
    pub locked: bool,
    pub remaining_seconds: Option<u64>,
}

impl LockStatus {
    const fn clear() -> Self {
        Self {
            locked: false,
            remaining_seconds: None,
        }
    }
}

/// Mutex-guarded lockout table. Every mutation is one critical section so
/// the threshold crossing is exact under concurrent failures.
#[derive(Debug)]
pub struct LockoutGuard {
    entries: Mutex<HashMap<String, LockoutEntry>>,
    max_failed_attempts: u32,
    lockout_duration: Duration,
}

impl Default for LockoutGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl LockoutGuard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_failed_attempts: MAX_FAILED_ATTEMPTS,
            lockout_duration: LOCKOUT_DURATION,
        }
    }

    #[must_use]
    pub fn with_max_failed_attempts(mut self, attempts: u32) -> Self {
        self.max_failed_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_lockout_duration(mut self, duration: Duration) -> Self {
        self.lockout_duration = duration;
        self
    }

    /// Record a failed login for `identifier`.
    ///
    /// Returns `true` iff the identifier is locked after this call: either
    /// this failure crossed the threshold, or an earlier lock is still
    /// active (active locks do not accumulate further attempts).
    pub fn record_failed_login(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let Ok(mut entries) = self.entries.lock() else {
            return false;
        };

        let Some(entry) = entries.get_mut(identifier) else {
            entries.insert(
                identifier.to_string(),
                LockoutEntry {
                    failed_attempts: 1,
                    locked_until: None,
                    last_attempt: now,
                },
            );
            return false;
        };

        if let Some(locked_until) = entry.locked_until {
            if now < locked_until {
                return true;
            }
            // Lock elapsed; this failure starts a fresh count.
            entry.failed_attempts = 1;
            entry.locked_until = None;
            entry.last_attempt = now;
            return false;
        }

        entry.failed_attempts += 1;
        entry.last_attempt = now;

        if entry.failed_attempts >= self.max_failed_attempts {
            entry.locked_until = Some(now + self.lockout_duration);
            return true;
        }

        false
    }

    /// Report whether `identifier` is currently locked, clearing locks that
    /// have already elapsed.
    pub fn is_account_locked(&self, identifier: &str) -> LockStatus {
        let Ok(mut entries) = self.entries.lock() else {
            return LockStatus::clear();
        };
        let Some(entry) = entries.get_mut(identifier) else {
            return LockStatus::clear();
        };
        let Some(locked_until) = entry.locked_until else {
            return LockStatus::clear();
        };

        let now = Instant::now();
        if now >= locked_until {
            entry.locked_until = None;
            entry.failed_attempts = 0;
            return LockStatus::clear();
        }

        let remaining_ms = locked_until.duration_since(now).as_millis();
        let remaining_seconds = u64::try_from(remaining_ms.div_ceil(1000)).unwrap_or(u64::MAX);
        LockStatus {
            locked: true,
            remaining_seconds: Some(remaining_seconds),
        }
    }

    /// Forget everything about `identifier`; called after a successful
    /// authentication.
    pub fn reset_failed_logins(&self, identifier: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(identifier);
        }
    }

    /// Purge entries whose lock expired more than the retention period ago.
    /// Advisory: bounds memory, never affects lock decisions.
    pub fn sweep(&self) {
        let now = Instant::now();
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, entry| match entry.locked_until {
                Some(locked_until) => now < locked_until + SWEEP_RETENTION,
                None => true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifth_failure_locks() {
        let guard = LockoutGuard::new();
        for _ in 0..4 {
            assert!(!guard.record_failed_login("@alice"));
        }
        assert!(guard.record_failed_login("@alice"));

        let status = guard.is_account_locked("@alice");
        assert!(status.locked);
        let remaining = status.remaining_seconds.expect("remaining seconds");
        assert!(remaining >= 1 && remaining <= 60, "remaining: {remaining}");
    }

    #[test]
    fn failures_below_threshold_do_not_lock() {
        let guard = LockoutGuard::new();
        for _ in 0..4 {
            guard.record_failed_login("@alice");
        }
        assert!(!guard.is_account_locked("@alice").locked);
    }

    #[test]
    fn active_lock_reports_still_locked_without_counting() {
        let guard = LockoutGuard::new();
        for _ in 0..5 {
            guard.record_failed_login("@alice");
        }
        // Further failures during the lock keep reporting locked.
        assert!(guard.record_failed_login("@alice"));
        assert!(guard.record_failed_login("@alice"));
    }

    #[test]
    fn identifiers_are_independent() {
        let guard = LockoutGuard::new();
        for _ in 0..5 {
            guard.record_failed_login("@alice");
        }
        assert!(!guard.record_failed_login("@bob"));
        assert!(!guard.is_account_locked("@bob").locked);
    }

    #[test]
    fn reset_clears_any_prior_count() {
        let guard = LockoutGuard::new();
        for _ in 0..5 {
            guard.record_failed_login("@alice");
        }
        guard.reset_failed_logins("@alice");
        assert!(!guard.is_account_locked("@alice").locked);
        // Fresh count starts from zero again.
        assert!(!guard.record_failed_login("@alice"));
    }

    #[test]
    fn lock_expires_and_clears_on_check() {
        let guard = LockoutGuard::new().with_lockout_duration(Duration::from_millis(30));
        for _ in 0..5 {
            guard.record_failed_login("@alice");
        }
        assert!(guard.is_account_locked("@alice").locked);

        std::thread::sleep(Duration::from_millis(40));
        assert!(!guard.is_account_locked("@alice").locked);
    }

    #[test]
    fn failure_after_expired_lock_starts_fresh_count() {
        let guard = LockoutGuard::new().with_lockout_duration(Duration::from_millis(30));
        for _ in 0..5 {
            guard.record_failed_login("@alice");
        }
        std::thread::sleep(Duration::from_millis(40));

        // First failure after expiry does not re-lock.
        assert!(!guard.record_failed_login("@alice"));
        assert!(!guard.is_account_locked("@alice").locked);
    }

    #[test]
    fn threshold_override_applies() {
        let guard = LockoutGuard::new().with_max_failed_attempts(2);
        assert!(!guard.record_failed_login("@alice"));
        assert!(guard.record_failed_login("@alice"));
    }

    #[test]
    fn sweep_keeps_tracking_and_active_locks() {
        let guard = LockoutGuard::new().with_lockout_duration(Duration::from_secs(60));
        guard.record_failed_login("tracking-only");
        for _ in 0..5 {
            guard.record_failed_login("locked");
        }

        guard.sweep();

        let entries = guard.entries.lock().expect("lock");
        assert!(entries.contains_key("tracking-only"));
        assert!(entries.contains_key("locked"));
    }
}
