use secrecy::SecretString;

/// Process-wide secret material, populated from the CLI/environment once at
/// startup and shared with handlers by reference.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub provider_client_id: String,
    pub provider_client_secret: SecretString,
    pub admin_password: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(provider_client_id: String, provider_client_secret: SecretString) -> Self {
        Self {
            provider_client_id,
            provider_client_secret,
            admin_password: None,
        }
    }

    pub fn set_admin_password(&mut self, password: SecretString) {
        self.admin_password = Some(password);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "client-id".to_string(),
            SecretString::from("client-secret"),
        );
        assert_eq!(args.provider_client_id, "client-id");
        assert_eq!(args.provider_client_secret.expose_secret(), "client-secret");
        assert!(args.admin_password.is_none());
    }

    #[test]
    fn test_set_admin_password() {
        let mut args = GlobalArgs::new("id".to_string(), SecretString::default());
        args.set_admin_password(SecretString::from("hunter2"));
        assert_eq!(
            args.admin_password.map(|p| p.expose_secret().to_string()),
            Some("hunter2".to_string())
        );
    }
}
