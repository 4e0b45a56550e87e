//! Error types for object storage operations

use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::ByteStreamError,
};
use thiserror::Error;

/// Result type for object storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during object storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// Object does not exist
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Bucket still holds objects and cannot be deleted
    #[error("Bucket is not empty: {0}")]
    BucketNotEmpty(String),

    /// Upstream service error (5xx from the provider)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// AWS SDK error (dispatch, timeout, response parsing)
    #[error("AWS SDK error: {0}")]
    AwsError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StorageError {
    /// Maps a provider error code and HTTP status to an error variant
    pub(crate) fn from_service_error(code: Option<&str>, status: u16, message: String) -> Self {
        match code {
            Some("NoSuchBucket") => Self::BucketNotFound(message),
            Some("NoSuchKey" | "NotFound") => Self::ObjectNotFound(message),
            Some("BucketNotEmpty") => Self::BucketNotEmpty(message),
            _ if status >= 500 => Self::UpstreamError(message),
            _ => Self::S3Error(message),
        }
    }
}

impl<E> From<SdkError<E>> for StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    fn from(error: SdkError<E>) -> Self {
        let message = DisplayErrorContext(&error).to_string();
        match &error {
            SdkError::ServiceError(service_err) => Self::from_service_error(
                service_err.err().code(),
                service_err.raw().status().as_u16(),
                message,
            ),
            _ => Self::AwsError(message),
        }
    }
}

impl From<ByteStreamError> for StorageError {
    fn from(error: ByteStreamError) -> Self {
        Self::AwsError(format!("Failed to read object body: {error}"))
    }
}
