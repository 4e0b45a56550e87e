//! Connection settings for the object storage provider

use std::fmt;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation};
use url::Url;

use crate::error::{StorageError, StorageResult};

/// Region used when none is configured. S3 treats it as the "no location constraint" region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Provider name attached to the static credentials
const CREDENTIALS_PROVIDER_NAME: &str = "oss-static";

/// Settings used to build the long-lived S3 client
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct OssConfig {
    /// Provider endpoint, e.g. `https://s3.amazonaws.com` or `http://localhost:9000`
    pub endpoint: String,
    /// Signing region
    pub region: String,
    /// Access key id. Empty together with `secret_key` selects the default AWS provider chain.
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub path_style_access: bool,
    /// Allow aws-chunked streaming uploads with trailing checksums.
    /// Some S3-compatible providers reject them, so this can be switched off.
    pub chunked_encoding: bool,
}

impl fmt::Debug for OssConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OssConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("path_style_access", &self.path_style_access)
            .field("chunked_encoding", &self.chunked_encoding)
            .finish()
    }
}

impl OssConfig {
    /// Checks that the configuration can be used to build a client
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the endpoint is not an absolute http(s) URL,
    /// the region is blank, or only one half of the credential pair is set
    pub fn validate(&self) -> StorageResult<()> {
        let endpoint = self.endpoint_url()?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(StorageError::ConfigError(format!(
                "Unsupported endpoint scheme: {}",
                endpoint.scheme()
            )));
        }

        if self.region.trim().is_empty() {
            return Err(StorageError::ConfigError("Region must not be empty".to_string()));
        }

        if self.access_key.is_empty() != self.secret_key.is_empty() {
            return Err(StorageError::ConfigError(
                "Access key and secret key must be set together".to_string(),
            ));
        }

        Ok(())
    }

    /// Parsed endpoint URL
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the endpoint cannot be parsed
    pub fn endpoint_url(&self) -> StorageResult<Url> {
        Url::parse(&self.endpoint).map_err(|e| {
            StorageError::ConfigError(format!("Invalid endpoint {}: {e}", self.endpoint))
        })
    }

    /// Whether static credentials are configured
    #[must_use]
    pub fn has_static_credentials(&self) -> bool {
        !self.access_key.is_empty() && !self.secret_key.is_empty()
    }

    /// S3 service configuration
    ///
    /// Static credentials are used when configured. Otherwise credentials come from the
    /// default AWS provider chain (environment, profile, instance metadata).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the configuration is invalid or no
    /// credentials provider can be resolved
    pub async fn s3_client_config(&self) -> StorageResult<aws_sdk_s3::Config> {
        self.validate()?;

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .endpoint_url(self.endpoint.trim_end_matches('/'))
            .force_path_style(self.path_style_access);

        if !self.chunked_encoding {
            builder =
                builder.request_checksum_calculation(RequestChecksumCalculation::WhenRequired);
        }

        if self.has_static_credentials() {
            builder = builder.credentials_provider(Credentials::new(
                &self.access_key,
                &self.secret_key,
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        } else {
            let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(self.region.clone()))
                .load()
                .await;
            let provider = sdk_config.credentials_provider().ok_or_else(|| {
                StorageError::ConfigError("No AWS credentials provider available".to_string())
            })?;
            builder = builder.credentials_provider(provider);
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localstack_config() -> OssConfig {
        OssConfig {
            endpoint: "http://localhost:4566".to_string(),
            region: DEFAULT_REGION.to_string(),
            access_key: "test".to_string(),
            secret_key: "test".to_string(),
            path_style_access: true,
            chunked_encoding: true,
        }
    }

    #[test]
    fn test_validate_accepts_localstack_config() {
        assert!(localstack_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut config = localstack_config();
        config.endpoint = "not a url".to_string();
        assert!(matches!(config.validate(), Err(StorageError::ConfigError(_))));

        config.endpoint = "ftp://localhost:21".to_string();
        assert!(matches!(config.validate(), Err(StorageError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_blank_region() {
        let mut config = localstack_config();
        config.region = "  ".to_string();
        assert!(matches!(config.validate(), Err(StorageError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_half_credentials() {
        let mut config = localstack_config();
        config.secret_key = String::new();
        assert!(matches!(config.validate(), Err(StorageError::ConfigError(_))));

        config.access_key = String::new();
        assert!(config.validate().is_ok());
        assert!(!config.has_static_credentials());
    }

    #[test]
    fn test_debug_redacts_secret_key() {
        let mut config = localstack_config();
        config.secret_key = "super-secret".to_string();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_s3_client_config_applies_settings() {
        let config = localstack_config();
        let s3_config = config.s3_client_config().await.unwrap();

        assert_eq!(
            s3_config.region().map(ToString::to_string).as_deref(),
            Some(DEFAULT_REGION)
        );
    }
}
