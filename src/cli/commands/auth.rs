use anyhow::Result;
use clap::{Arg, Command};
use secrecy::SecretString;

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("frontend-base-url")
                .long("frontend-base-url")
                .help("Frontend base URL, used as the allowed CORS origin")
                .env("QUILL_FRONTEND_BASE_URL")
                .default_value("https://quill.blog"),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session cookie TTL in seconds")
                .env("QUILL_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("admin-password")
                .long("admin-password")
                .help("Initial administrator password; when set, the reserved @admin account is created once at startup")
                .env("QUILL_ADMIN_PASSWORD"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub admin_password: Option<SecretString>,
}

impl Options {
    /// Extract auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is somehow missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let frontend_base_url = matches
            .get_one::<String>("frontend-base-url")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --frontend-base-url"))?;
        let session_ttl_seconds = matches
            .get_one::<i64>("session-ttl-seconds")
            .copied()
            .unwrap_or(2_592_000);
        let admin_password = matches
            .get_one::<String>("admin-password")
            .map(|p| SecretString::from(p.clone()));

        Ok(Self {
            frontend_base_url,
            session_ttl_seconds,
            admin_password,
        })
    }
}
