use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use axum_valid::Valid;
use object_storage::{Bucket, ObjectStorage, StorageError};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use super::{to_rfc3339, BucketPath};
use crate::types::AppError;

/// Bucket as returned by the API
#[derive(Debug, Serialize, JsonSchema)]
pub struct BucketResponse {
    /// Bucket name
    pub name: String,
    /// ISO-8601 UTC creation timestamp, when the provider reports one
    pub creation_date: Option<String>,
}

impl From<Bucket> for BucketResponse {
    fn from(bucket: Bucket) -> Self {
        Self {
            name: bucket.name,
            creation_date: to_rfc3339(bucket.creation_date),
        }
    }
}

/// Creates a bucket and returns it
///
/// Creating a bucket that already exists is not an error.
///
/// # Errors
///
/// - `StorageError::BucketNotFound` - The bucket vanished between creation and read-back
/// - `StorageError::S3Error` - The provider rejected the bucket name or request
/// - `StorageError::UpstreamError` - 5xx errors from the provider
#[instrument(skip(object_storage))]
pub async fn create_bucket(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
    Valid(Path(path)): Valid<Path<BucketPath>>,
) -> Result<Json<BucketResponse>, AppError> {
    object_storage.create_bucket(&path.bucket_name).await?;

    let bucket = object_storage
        .get_bucket(&path.bucket_name)
        .await?
        .ok_or(StorageError::BucketNotFound(path.bucket_name))?;

    Ok(Json(bucket.into()))
}

/// Lists all buckets visible to the configured credentials
///
/// # Errors
///
/// - `StorageError::S3Error` / `StorageError::UpstreamError` - Provider failures
#[instrument(skip(object_storage))]
pub async fn list_buckets(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
) -> Result<Json<Vec<BucketResponse>>, AppError> {
    let buckets = object_storage.list_buckets().await?;

    Ok(Json(buckets.into_iter().map(Into::into).collect()))
}

/// Returns a single bucket by exact name
///
/// # Errors
///
/// - `StorageError::BucketNotFound` - No bucket with that name exists
#[instrument(skip(object_storage))]
pub async fn get_bucket(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
    Valid(Path(path)): Valid<Path<BucketPath>>,
) -> Result<Json<BucketResponse>, AppError> {
    match object_storage.get_bucket(&path.bucket_name).await? {
        Some(bucket) => Ok(Json(bucket.into())),
        None => Err(StorageError::BucketNotFound(path.bucket_name).into()),
    }
}

/// Deletes an empty bucket
///
/// # Errors
///
/// - `StorageError::BucketNotFound` - The bucket does not exist
/// - `StorageError::BucketNotEmpty` - The bucket still holds objects
#[instrument(skip(object_storage))]
pub async fn delete_bucket(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
    Valid(Path(path)): Valid<Path<BucketPath>>,
) -> Result<StatusCode, AppError> {
    object_storage.delete_bucket(&path.bucket_name).await?;

    Ok(StatusCode::ACCEPTED)
}
