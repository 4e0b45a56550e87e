//! Object storage client for S3-compatible providers
//!
//! Wraps a single long-lived S3 client and exposes bucket and object operations.
//! Every operation maps onto one provider call; nothing is cached locally.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

mod bucket;
mod config;
mod error;
mod object;
mod presign;

use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use tracing::info;
use url::Url;

pub use bucket::Bucket;
pub use config::{OssConfig, DEFAULT_REGION};
pub use error::{StorageError, StorageResult};
pub use object::{ObjectInfo, ObjectSummary, StoredObject};
pub use presign::{PresignedUrl, MAX_PRESIGNED_URL_EXPIRY};

/// Storage client bound to one provider endpoint and credential set
pub struct ObjectStorage {
    s3_client: Arc<S3Client>,
    endpoint: Url,
    path_style_access: bool,
}

impl ObjectStorage {
    /// Creates a new object storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `config` - Settings the client was built from, used for unsigned object URLs
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the configured endpoint is not a valid URL
    pub fn new(s3_client: Arc<S3Client>, config: &OssConfig) -> StorageResult<Self> {
        Ok(Self {
            s3_client,
            endpoint: config.endpoint_url()?,
            path_style_access: config.path_style_access,
        })
    }

    /// Builds the S3 client from `config` and wraps it
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the configuration is invalid
    pub async fn from_config(config: &OssConfig) -> StorageResult<Self> {
        let s3_client = Arc::new(S3Client::from_conf(config.s3_client_config().await?));

        info!(
            "Initialized object storage client for endpoint: {} (region: {}, path style: {})",
            config.endpoint, config.region, config.path_style_access
        );

        Self::new(s3_client, config)
    }
}

/// Converts a provider timestamp into a UTC `chrono` timestamp
pub(crate) fn to_utc(timestamp: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}
