//! # Quill (multi-user blogging platform)
//!
//! `quill` is a small blogging service: users register with credentials or
//! arrive through a federated identity provider, complete a one-time public
//! profile (handle + nickname), publish posts, and follow each other.
//!
//! ## Login Security Pipeline
//!
//! Credentials logins pass through a layered pipeline before a session is
//! issued:
//!
//! 1. **Lockout guard**: per-handle failed-attempt counters; five failures
//!    lock the handle for sixty seconds.
//! 2. **Rate limiter**: fixed-window counters keyed by client address and
//!    action (`login:` and `register:` namespaces are independent).
//! 3. **Credential verification**: argon2 against the stored hash.
//! 4. **Audit log**: bounded in-memory record of security events.
//!
//! Every failed login returns the same generic response so callers cannot
//! distinguish a wrong password from an unknown handle or an active lockout.
//! The audit log records the real reason internally.
//!
//! ## Profiles and Handles
//!
//! Handles are `@`-prefixed, at least four characters including the marker,
//! and unique case-insensitively. Federated accounts start without a handle
//! and must complete profile setup before posting; setup assigns the handle
//! exactly once.
//!
//! ## Content and Social Graph
//!
//! Posts snapshot the author's handle and nickname at creation time; the
//! copies are deliberately not re-joined against later profile edits.
//! Follow edges are directed, self-follows are rejected, and both follow
//! and unfollow are idempotent.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
