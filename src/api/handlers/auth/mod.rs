//! Auth handlers and supporting modules.
//!
//! This module coordinates credentials and federated authentication,
//! session management, and the login security pipeline.
//!
//! ## Login Security Pipeline
//!
//! Credentials logins are guarded before any credential is examined:
//!
//! - **Lockout:** 5 failed attempts lock a handle for 60 seconds. The lock
//!   is keyed by handle, so it throttles guessing against one account and
//!   nothing more.
//! - **Rate limiting:** fixed-window counters per client address: 10 login
//!   attempts per 15 minutes, 5 registrations per hour, in independent
//!   namespaces.
//! - **Audit:** every outcome is appended to a bounded in-memory log with
//!   its internal reason; the HTTP response never distinguishes failures.
//!
//! All three stores live in [`AuthState`], constructed once at startup and
//! injected into handlers, never as module-level singletons.

pub(crate) mod audit;
pub(crate) mod federated;
pub(crate) mod lockout;
pub(crate) mod login;
pub(crate) mod principal;
mod rate_limit;
pub(crate) mod register;
pub(crate) mod session;
mod state;
pub(crate) mod storage;
pub(crate) mod types;
mod utils;

pub use audit::{AuditEvent, AuditEventKind, AuditLog};
pub use lockout::{LockStatus, LockoutGuard};
pub use rate_limit::{FixedWindowRateLimiter, NoopRateLimiter, RateLimitDecision, RateLimiter};
pub use state::{AuthConfig, AuthState};
pub(crate) use state::spawn_store_sweeper;
pub(crate) use utils::{hash_password, normalize_handle, valid_handle, NICKNAME_MIN_LEN};
