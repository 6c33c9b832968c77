//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Scam threshold must lie strictly between 0 and 1")]
    InvalidThreshold,

    #[error("History weight and margin must be non-negative")]
    InvalidHistoryWeighting,

    #[error("Turn limits must be positive with min_turns_with_intel <= max_turns")]
    InvalidTurnLimits,

    #[error("Reply limits must be positive")]
    InvalidReplyLimits,

    #[error("Invalid callback URL format")]
    InvalidCallbackUrl,

    #[error("Callback attempts must be between 1 and 5")]
    InvalidCallbackAttempts,

    #[error("Invalid AI base URL format")]
    InvalidAiBaseUrl,
}
