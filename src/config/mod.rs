//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `HONEYPOT_` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use honeypot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on port {}", config.server.port);
//! ```

mod ai;
mod auth;
mod callback;
mod detection;
mod engagement;
mod error;
mod server;

pub use ai::{AiConfig, AiProvider};
pub use auth::AuthConfig;
pub use callback::CallbackConfig;
pub use detection::DetectionConfig;
pub use engagement::EngagementConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared API key for callers
    #[serde(default)]
    pub auth: AuthConfig,

    /// Scam scorer thresholds
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Completion limits and persona reply budget
    #[serde(default)]
    pub engagement: EngagementConfig,

    /// Final-result callback delivery
    #[serde(default)]
    pub callback: CallbackConfig,

    /// AI provider for persona replies (optional)
    #[serde(default)]
    pub ai: AiConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `HONEYPOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `HONEYPOT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `HONEYPOT__DETECTION__SCAM_THRESHOLD=0.7` -> `detection.scam_threshold = 0.7`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("HONEYPOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid,
    /// including a missing caller API key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate()?;
        self.detection.validate()?;
        self.engagement.validate()?;
        self.callback.validate()?;
        self.ai.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "HONEYPOT__AUTH__API_KEY",
        "HONEYPOT__SERVER__PORT",
        "HONEYPOT__SERVER__ENVIRONMENT",
        "HONEYPOT__DETECTION__SCAM_THRESHOLD",
        "HONEYPOT__ENGAGEMENT__MAX_TURNS",
        "HONEYPOT__CALLBACK__URL",
        "HONEYPOT__AI__PROVIDER",
        "HONEYPOT__AI__API_KEY",
    ];

    fn set_minimal_env() {
        env::set_var("HONEYPOT__AUTH__API_KEY", "test-key-123");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        let key = config.auth.api_key.as_ref().unwrap();
        assert_eq!(key.expose_secret(), "test-key-123");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("HONEYPOT__AUTH__API_KEY"))
        );
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.detection.scam_threshold, 0.65);
        assert_eq!(config.engagement.max_turns, 8);
        assert_eq!(config.callback.attempts_per_dispatch, 2);
        assert!(!config.ai.is_configured());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("HONEYPOT__SERVER__PORT", "3000");
        env::set_var("HONEYPOT__DETECTION__SCAM_THRESHOLD", "0.7");
        env::set_var("HONEYPOT__ENGAGEMENT__MAX_TURNS", "12");
        env::set_var("HONEYPOT__CALLBACK__URL", "http://localhost:9000/result");
        env::set_var("HONEYPOT__AI__PROVIDER", "gemini");
        env::set_var("HONEYPOT__AI__API_KEY", "gm-key");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.detection.scam_threshold, 0.7);
        assert_eq!(config.engagement.max_turns, 12);
        assert_eq!(config.callback.url, "http://localhost:9000/result");
        assert_eq!(config.ai.provider, AiProvider::Gemini);
        assert!(config.ai.is_configured());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("HONEYPOT__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_out_of_range_threshold_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("HONEYPOT__DETECTION__SCAM_THRESHOLD", "1.5");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::InvalidThreshold));
    }
}
