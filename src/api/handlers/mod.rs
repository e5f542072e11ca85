//! API handlers for Quill.
//!
//! Route handlers are grouped by surface: `auth` carries the login security
//! pipeline (lockout, rate limiting, audit) plus registration, federated
//! sign-in, and sessions; `posts` and `users` cover content and the social
//! graph; `profile` holds the one-time setup flow.

pub mod auth;
pub mod health;
pub mod posts;
pub mod profile;
pub mod root;
pub mod users;
