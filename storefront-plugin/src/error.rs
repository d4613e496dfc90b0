//! Plugin layer errors.

use storefront_core::{AvailabilityError, StoreError, TypeError};
use thiserror::Error;

/// Errors raised while building or running plugin providers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PluginError {
    #[error("Type error: {0}")]
    Type(TypeError),

    #[error("Availability error: {0}")]
    Availability(AvailabilityError),

    #[error("Unknown plugin provider \"{name}\"")]
    UnknownProvider { name: String },

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for PluginError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Type(err) => PluginError::Type(err),
            StoreError::Availability(err) => PluginError::Availability(err),
            other => PluginError::Store(other),
        }
    }
}

/// Result type alias for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
