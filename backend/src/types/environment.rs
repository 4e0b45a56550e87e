//! Environment configuration for different deployment stages

use std::env;

use object_storage::{OssConfig, StorageError, StorageResult, DEFAULT_REGION};
use tracing::Level;

/// `LocalStack` endpoint used in development
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Object storage connection settings
    ///
    /// Development falls back to `LocalStack` defaults. Other environments require
    /// `OSS_ENDPOINT`; when `OSS_ACCESS_KEY` and `OSS_SECRET_KEY` are both unset the
    /// default AWS credential chain is used.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if a required variable is missing or the
    /// resulting configuration is invalid
    pub fn oss_config(&self) -> StorageResult<OssConfig> {
        let config = match self {
            Self::Production | Self::Staging => OssConfig {
                endpoint: required_var("OSS_ENDPOINT")?,
                region: env::var("OSS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
                access_key: env::var("OSS_ACCESS_KEY").unwrap_or_default(),
                secret_key: env::var("OSS_SECRET_KEY").unwrap_or_default(),
                path_style_access: flag_var("OSS_PATH_STYLE_ACCESS", false),
                chunked_encoding: flag_var("OSS_CHUNKED_ENCODING", true),
            },
            Self::Development => OssConfig {
                endpoint: env::var("OSS_ENDPOINT")
                    .unwrap_or_else(|_| LOCALSTACK_ENDPOINT.to_string()),
                region: env::var("OSS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
                access_key: env::var("OSS_ACCESS_KEY").unwrap_or_else(|_| "test".to_string()),
                secret_key: env::var("OSS_SECRET_KEY").unwrap_or_else(|_| "test".to_string()),
                // Override "force path style" to true for compatibility with LocalStack
                path_style_access: flag_var("OSS_PATH_STYLE_ACCESS", true),
                chunked_encoding: flag_var("OSS_CHUNKED_ENCODING", true),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Whether the object storage client should be built (`OSS_ENABLE`, default on)
    #[must_use]
    pub fn oss_enabled(&self) -> bool {
        flag_var("OSS_ENABLE", true)
    }

    /// Whether the `/oss` endpoints are mounted (`OSS_INFO`, default off)
    #[must_use]
    pub fn oss_info(&self) -> bool {
        flag_var("OSS_INFO", false)
    }

    /// Path prefix for the `/oss` endpoints (`OSS_HTTP_PREFIX`)
    ///
    /// Normalized to either an empty string or a path with a leading and no trailing slash.
    #[must_use]
    pub fn http_prefix(&self) -> String {
        env::var("OSS_HTTP_PREFIX")
            .map(|prefix| normalize_prefix(&prefix))
            .unwrap_or_default()
    }

    /// Default log level when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}

fn required_var(name: &str) -> StorageResult<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| StorageError::ConfigError(format!("{name} environment variable is not set")))
}

/// Reads a boolean flag, falling back to `default` when unset or unparsable
fn flag_var(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_flag(&value))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
