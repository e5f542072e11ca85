//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action, such as starting the API server with its full
//! configuration state.

use crate::cli::commands::{auth, provider};
use crate::cli::{actions::server::Args, actions::Action};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;
    let provider_opts = provider::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        frontend_base_url: auth_opts.frontend_base_url,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        admin_password: auth_opts.admin_password,
        provider_client_id: provider_opts.client_id,
        provider_client_secret: provider_opts.client_secret,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn dsn_required() {
        temp_env::with_vars([("QUILL_DSN", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let result = command.try_get_matches_from(vec!["quill"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn server_action_carries_options() {
        temp_env::with_vars(
            [
                ("QUILL_DSN", Some("postgres://localhost:5432/quill")),
                ("QUILL_SESSION_TTL_SECONDS", Some("3600")),
                ("QUILL_ADMIN_PASSWORD", Some("Secr3tPass")),
                ("QUILL_PROVIDER_CLIENT_ID", Some("client-id")),
                ("QUILL_PROVIDER_CLIENT_SECRET", Some("client-secret")),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["quill"]);
                let action = handler(&matches).expect("handler should succeed");
                let Action::Server(args) = action;
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://localhost:5432/quill");
                assert_eq!(args.session_ttl_seconds, 3600);
                assert!(args.admin_password.is_some());
                assert_eq!(args.provider_client_id, "client-id");
            },
        );
    }
}
