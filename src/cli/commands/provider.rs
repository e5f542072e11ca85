use anyhow::Result;
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_PROVIDER_CLIENT_ID: &str = "provider-client-id";
pub const ARG_PROVIDER_CLIENT_SECRET: &str = "provider-client-secret";

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROVIDER_CLIENT_ID)
                .long(ARG_PROVIDER_CLIENT_ID)
                .help("Federated identity provider client id")
                .env("QUILL_PROVIDER_CLIENT_ID")
                .default_value(""),
        )
        .arg(
            Arg::new(ARG_PROVIDER_CLIENT_SECRET)
                .long(ARG_PROVIDER_CLIENT_SECRET)
                .help("Shared secret presented by the identity-provider bridge on federated sign-in callbacks")
                .env("QUILL_PROVIDER_CLIENT_SECRET")
                .default_value(""),
        )
}

#[derive(Debug)]
pub struct Options {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl Options {
    /// Extract provider options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is somehow missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let client_id = matches
            .get_one::<String>(ARG_PROVIDER_CLIENT_ID)
            .cloned()
            .unwrap_or_default();
        let client_secret = matches
            .get_one::<String>(ARG_PROVIDER_CLIENT_SECRET)
            .map(|s| SecretString::from(s.clone()))
            .unwrap_or_default();

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}
