//! Caller authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Shared-key authentication for the honeypot endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Key callers must present in the `x-api-key` header
    pub api_key: Option<SecretString>,
}

impl AuthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::new(api_key.into())),
        }
    }

    /// Check if a non-empty key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("HONEYPOT__AUTH__API_KEY"));
        }
        Ok(())
    }
}
