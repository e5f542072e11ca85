use crate::{api, cli::globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub admin_password: Option<SecretString>,
    pub provider_client_id: String,
    pub provider_client_secret: SecretString,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the database is unreachable or the server fails to
/// start.
pub async fn execute(args: Args) -> Result<()> {
    let mut globals = GlobalArgs::new(args.provider_client_id, args.provider_client_secret);
    if let Some(password) = args.admin_password {
        globals.set_admin_password(password);
    }

    let auth_config = api::handlers::auth::AuthConfig::new(args.frontend_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    api::new(args.port, args.dsn, &globals, auth_config).await
}
