//! Configuration of the admin clients.
//!
//! Loaded from a TOML file (`STOREFRONT_CONFIG`) or from `STOREFRONT_*`
//! environment variables. Every section has defaults, unknown keys are
//! rejected.

use crate::client::DECORATORS;
use crate::telemetry::LogConfig;
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";

/// Complete admin configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    #[serde(default)]
    pub product_image: ClientConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Composition of one admin client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Names of the sub-clients to render, in order.
    #[serde(default)]
    pub subparts: Vec<String>,
    /// Decorators wrapped around each sub-client, innermost first.
    #[serde(default)]
    pub decorators: Vec<String>,
}

/// Storage of uploaded media files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Path prefix of stored files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Accepted MIME types of uploads.
    #[serde(default = "default_mime_types")]
    pub mime_types: Vec<String>,
}

fn default_upload_dir() -> String {
    "files".to_string()
}

fn default_mime_types() -> Vec<String> {
    ["image/gif", "image/jpeg", "image/png", "image/webp"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            mime_types: default_mime_types(),
        }
    }
}

impl AdminConfig {
    /// Load from the file named by `STOREFRONT_CONFIG`, else from the
    /// environment, and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from) {
            Some(path) => Self::from_path(&path)?,
            None => Self::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STOREFRONT_IMAGE_SUBPARTS`: comma-separated sub-client names (default: none)
    /// - `STOREFRONT_IMAGE_DECORATORS`: comma-separated decorator names (default: none)
    /// - `STOREFRONT_UPLOAD_DIR`: path prefix of stored files (default: "files")
    /// - `STOREFRONT_MIME_TYPES`: comma-separated accepted MIME types
    /// - `STOREFRONT_LOG_FILTER`: tracing filter directive (default: "info")
    /// - `STOREFRONT_LOG_JSON`: "true" for JSON log lines (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Configuration from variables provided by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let list = |name: &str| lookup(name).map(|s| split_list(&s));
        let defaults = Self::default();

        Self {
            product_image: ClientConfig {
                subparts: list("STOREFRONT_IMAGE_SUBPARTS").unwrap_or_default(),
                decorators: list("STOREFRONT_IMAGE_DECORATORS").unwrap_or_default(),
            },
            media: MediaConfig {
                upload_dir: lookup("STOREFRONT_UPLOAD_DIR").unwrap_or(defaults.media.upload_dir),
                mime_types: list("STOREFRONT_MIME_TYPES").unwrap_or(defaults.media.mime_types),
            },
            log: LogConfig {
                filter: lookup("STOREFRONT_LOG_FILTER").unwrap_or(defaults.log.filter),
                json: lookup("STOREFRONT_LOG_JSON")
                    .map(|s| s.eq_ignore_ascii_case("true"))
                    .unwrap_or(defaults.log.json),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for name in &self.product_image.subparts {
            if name.trim().is_empty() {
                return Err(invalid("product_image.subparts", "names must not be empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(invalid(
                    "product_image.subparts",
                    &format!("\"{}\" is listed twice", name),
                ));
            }
        }
        for name in &self.product_image.decorators {
            if !DECORATORS.contains(&name.as_str()) {
                return Err(ConfigError::UnknownDecorator { name: name.clone() });
            }
        }
        if self.media.upload_dir.trim().is_empty() {
            return Err(invalid("media.upload_dir", "must not be empty"));
        }
        if self.media.mime_types.is_empty() {
            return Err(invalid("media.mime_types", "at least one type is required"));
        }
        if self.log.filter.trim().is_empty() {
            return Err(invalid("log.filter", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
