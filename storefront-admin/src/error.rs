//! Admin layer errors.

use storefront_core::StoreError;
use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unknown sub-client \"{name}\"")]
    UnknownClient { name: String },

    #[error("Unknown decorator \"{name}\"")]
    UnknownDecorator { name: String },
}

/// Errors returned by admin clients.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Saving failed; details are recorded in the view's error map.
    #[error("Saving {section} failed")]
    Save { section: String },

    #[error("No uploaded file for {index}. new entry")]
    MissingUpload { index: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to initialise tracing: {reason}")]
    Telemetry { reason: String },
}

/// Result type alias for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;
