//! Presigned URL generation

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{ObjectStorage, StorageError, StorageResult};

/// Longest lifetime SigV4 allows for a presigned URL (7 days)
pub const MAX_PRESIGNED_URL_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL
    pub url: String,
    /// UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

fn presigning_config(expires_in: Duration) -> StorageResult<PresigningConfig> {
    if expires_in.is_zero() || expires_in > MAX_PRESIGNED_URL_EXPIRY {
        return Err(StorageError::InvalidInput(format!(
            "Presigned URL expiry must be between 1 second and {} seconds, got {} seconds",
            MAX_PRESIGNED_URL_EXPIRY.as_secs(),
            expires_in.as_secs()
        )));
    }

    PresigningConfig::expires_in(expires_in)
        .map_err(|e| StorageError::ConfigError(format!("Failed to create presigning config: {e}")))
}

fn expires_at(expires_in: Duration) -> DateTime<Utc> {
    Utc::now() + expires_in
}

impl ObjectStorage {
    /// Generates a presigned URL for GET operations
    ///
    /// # Arguments
    ///
    /// * `bucket_name` - Bucket holding the object
    /// * `key` - Object key
    /// * `expires_in` - URL lifetime, at most [`MAX_PRESIGNED_URL_EXPIRY`]
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` if `expires_in` is zero or too long
    /// Returns `StorageError` if signing fails
    pub async fn presigned_get_url(
        &self,
        bucket_name: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        let config = presigning_config(expires_in)?;

        let presigned = self
            .s3_client
            .get_object()
            .bucket(bucket_name)
            .key(key)
            .presigned(config)
            .await?;

        let expires_at = expires_at(expires_in);
        debug!("Generated presigned GET URL for {bucket_name}/{key} expiring at {expires_at}");

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            expires_at,
        })
    }

    /// Generates a presigned URL for PUT operations
    ///
    /// The URL does not pin content type or length, any body can be uploaded until it expires.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` if `expires_in` is zero or too long
    /// Returns `StorageError` if signing fails
    pub async fn presigned_put_url(
        &self,
        bucket_name: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        let config = presigning_config(expires_in)?;

        let presigned = self
            .s3_client
            .put_object()
            .bucket(bucket_name)
            .key(key)
            .presigned(config)
            .await?;

        let expires_at = expires_at(expires_in);
        debug!("Generated presigned PUT URL for {bucket_name}/{key} expiring at {expires_at}");

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            expires_at,
        })
    }
}
