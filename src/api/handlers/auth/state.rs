//! Auth state and configuration.
//!
//! One `AuthState` is built at process start and handed to every handler via
//! an `Extension`; the rate-limit, lockout, and audit stores live inside it
//! rather than as module-level singletons so tests construct isolated
//! instances per case.

use std::sync::Arc;
use std::time::Duration;

use super::audit::AuditLog;
use super::lockout::LockoutGuard;
use super::rate_limit::RateLimiter;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;
// Advisory cleanup cadence for the in-memory counter tables.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    session_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(super) fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    rate_limiter: Arc<dyn RateLimiter>,
    lockout: LockoutGuard,
    audit: AuditLog,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        rate_limiter: Arc<dyn RateLimiter>,
        lockout: LockoutGuard,
        audit: AuditLog,
    ) -> Self {
        Self {
            config,
            rate_limiter,
            lockout,
            audit,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    pub(crate) fn lockout(&self) -> &LockoutGuard {
        &self.lockout
    }

    pub(crate) fn audit(&self) -> &AuditLog {
        &self.audit
    }
}

/// Background task that periodically drops expired rate-limit and lockout
/// entries. Advisory only: both stores also reset entries lazily on access.
pub(crate) fn spawn_store_sweeper(state: Arc<AuthState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        // First tick fires immediately; skip it so startup stays quiet.
        interval.tick().await;
        loop {
            interval.tick().await;
            state.rate_limiter().sweep();
            state.lockout().sweep();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::super::rate_limit::NoopRateLimiter;
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("https://quill.blog".to_string());

        assert_eq!(config.frontend_base_url(), "https://quill.blog");
        assert_eq!(
            config.session_ttl_seconds(),
            super::DEFAULT_SESSION_TTL_SECONDS
        );
        assert!(config.session_cookie_secure());

        let config = config.with_session_ttl_seconds(3600);
        assert_eq!(config.session_ttl_seconds(), 3600);
    }

    #[test]
    fn cookie_secure_follows_scheme() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        assert!(!config.session_cookie_secure());
    }

    #[test]
    fn auth_state_owns_its_stores() {
        let state = AuthState::new(
            AuthConfig::new("https://quill.blog".to_string()),
            Arc::new(NoopRateLimiter),
            LockoutGuard::new(),
            AuditLog::new(),
        );

        assert!(!state.lockout().is_account_locked("@alice").locked);
        assert!(state.audit().recent(10).is_empty());
    }
}
