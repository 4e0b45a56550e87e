use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path},
    http::StatusCode,
    Extension, Json,
};
use axum_valid::Valid;
use object_storage::{ObjectInfo, ObjectStorage, ObjectSummary, PresignedUrl};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use super::{format_timestamp, to_rfc3339, BucketPath, ObjectPath, PresignPath};
use crate::types::AppError;

/// Multipart field carrying the uploaded file
pub const OBJECT_FIELD_NAME: &str = "object";

/// Entry of an object listing
#[derive(Debug, Serialize, JsonSchema)]
pub struct ObjectSummaryResponse {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: Option<i64>,
    /// Entity tag
    pub etag: Option<String>,
    /// ISO-8601 UTC timestamp of the last modification
    pub last_modified: Option<String>,
    /// Storage class
    pub storage_class: Option<String>,
}

impl From<ObjectSummary> for ObjectSummaryResponse {
    fn from(summary: ObjectSummary) -> Self {
        Self {
            key: summary.key,
            size: summary.size,
            etag: summary.etag,
            last_modified: to_rfc3339(summary.last_modified),
            storage_class: summary.storage_class,
        }
    }
}

/// Metadata of a stored object
#[derive(Debug, Serialize, JsonSchema)]
pub struct ObjectInfoResponse {
    /// Bucket holding the object
    pub bucket: String,
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: Option<i64>,
    /// Entity tag
    pub etag: Option<String>,
    /// Stored content type
    pub content_type: Option<String>,
    /// ISO-8601 UTC timestamp of the last modification
    pub last_modified: Option<String>,
    /// Storage class
    pub storage_class: Option<String>,
    /// Unsigned object URL, readable only when the bucket allows anonymous access
    pub url: String,
}

impl ObjectInfoResponse {
    fn new(info: ObjectInfo, url: String) -> Self {
        Self {
            bucket: info.bucket,
            key: info.key,
            size: info.size,
            etag: info.etag,
            content_type: info.content_type,
            last_modified: to_rfc3339(info.last_modified),
            storage_class: info.storage_class,
            url,
        }
    }
}

/// Signed URL for a single object operation
#[derive(Debug, Serialize, JsonSchema)]
pub struct PresignedUrlResponse {
    /// Bucket holding the object
    pub bucket: String,
    /// Object key
    pub object: String,
    /// Signed URL
    pub url: String,
    /// Requested lifetime in minutes
    pub expires: u32,
    /// ISO-8601 UTC timestamp when the URL expires
    pub expires_at: String,
}

impl PresignedUrlResponse {
    fn new(path: PresignPath, presigned: PresignedUrl) -> Self {
        Self {
            bucket: path.bucket_name,
            object: path.object_name,
            url: presigned.url,
            expires: path.expires,
            expires_at: format_timestamp(presigned.expires_at),
        }
    }
}

/// File part extracted from a multipart upload
struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    content: Bytes,
}

/// Reads the `object` field of a multipart body, skipping any other field
async fn read_object_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(OBJECT_FIELD_NAME) {
            continue;
        }

        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let content = field.bytes().await.map_err(multipart_error)?;

        return Ok(UploadedFile {
            file_name,
            content_type,
            content,
        });
    }

    Err(AppError::new(
        StatusCode::BAD_REQUEST,
        "missing_object",
        "Multipart field `object` is required",
        false,
    ))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "Upload exceeds the maximum allowed size",
            false,
        )
    } else {
        tracing::debug!("Malformed multipart body: {err}");
        AppError::new(
            StatusCode::BAD_REQUEST,
            "invalid_multipart",
            "Malformed multipart body",
            false,
        )
    }
}

/// Stores an upload under `key` and reads its metadata back
async fn store(
    object_storage: &ObjectStorage,
    bucket_name: &str,
    key: &str,
    file: UploadedFile,
) -> Result<Json<ObjectInfoResponse>, AppError> {
    object_storage
        .put_object(bucket_name, key, file.content, file.content_type.as_deref())
        .await?;

    let info = object_storage.get_object_info(bucket_name, key).await?;
    let url = object_storage.object_url(bucket_name, key)?;

    Ok(Json(ObjectInfoResponse::new(info, url)))
}

/// Uploads the `object` multipart field, keyed by its file name
///
/// # Errors
///
/// - `missing_object` - No `object` field in the body
/// - `missing_file_name` - The field carries no file name
/// - `StorageError::BucketNotFound` - The bucket does not exist
#[instrument(skip(object_storage, multipart))]
pub async fn upload_object_named_by_file(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
    Valid(Path(path)): Valid<Path<BucketPath>>,
    multipart: Multipart,
) -> Result<Json<ObjectInfoResponse>, AppError> {
    let file = read_object_field(multipart).await?;

    let Some(key) = file.file_name.clone().filter(|name| !name.trim().is_empty()) else {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "missing_file_name",
            "Uploaded file has no file name",
            false,
        ));
    };

    store(&object_storage, &path.bucket_name, &key, file).await
}

/// Uploads the `object` multipart field under the key given in the path
///
/// # Errors
///
/// - `missing_object` - No `object` field in the body
/// - `StorageError::BucketNotFound` - The bucket does not exist
#[instrument(skip(object_storage, multipart))]
pub async fn upload_object(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
    Valid(Path(path)): Valid<Path<ObjectPath>>,
    multipart: Multipart,
) -> Result<Json<ObjectInfoResponse>, AppError> {
    let file = read_object_field(multipart).await?;

    store(&object_storage, &path.bucket_name, &path.object_name, file).await
}

/// Lists objects whose key starts with `object_name`
///
/// # Errors
///
/// - `StorageError::BucketNotFound` - The bucket does not exist
#[instrument(skip(object_storage))]
pub async fn list_objects(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
    Valid(Path(path)): Valid<Path<ObjectPath>>,
) -> Result<Json<Vec<ObjectSummaryResponse>>, AppError> {
    let objects = object_storage
        .list_objects(&path.bucket_name, &path.object_name)
        .await?;

    Ok(Json(objects.into_iter().map(Into::into).collect()))
}

/// Creates a signed download URL valid for `expires` minutes
///
/// # Errors
///
/// - `StorageError::InvalidInput` - Lifetime outside the accepted range
/// - `StorageError::ConfigError` - Failed to create presigning configuration
#[instrument(skip(object_storage))]
pub async fn presigned_get_url(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
    Valid(Path(path)): Valid<Path<PresignPath>>,
) -> Result<Json<PresignedUrlResponse>, AppError> {
    let presigned = object_storage
        .presigned_get_url(
            &path.bucket_name,
            &path.object_name,
            expires_in(path.expires),
        )
        .await?;

    Ok(Json(PresignedUrlResponse::new(path, presigned)))
}

/// Creates a signed upload URL valid for `expires` minutes
///
/// # Errors
///
/// - `StorageError::InvalidInput` - Lifetime outside the accepted range
/// - `StorageError::ConfigError` - Failed to create presigning configuration
#[instrument(skip(object_storage))]
pub async fn presigned_put_url(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
    Valid(Path(path)): Valid<Path<PresignPath>>,
) -> Result<Json<PresignedUrlResponse>, AppError> {
    let presigned = object_storage
        .presigned_put_url(
            &path.bucket_name,
            &path.object_name,
            expires_in(path.expires),
        )
        .await?;

    Ok(Json(PresignedUrlResponse::new(path, presigned)))
}

/// Deletes a single object
///
/// # Errors
///
/// - `StorageError::BucketNotFound` - The bucket does not exist
#[instrument(skip(object_storage))]
pub async fn delete_object(
    Extension(object_storage): Extension<Arc<ObjectStorage>>,
    Valid(Path(path)): Valid<Path<ObjectPath>>,
) -> Result<StatusCode, AppError> {
    object_storage
        .delete_object(&path.bucket_name, &path.object_name)
        .await?;

    Ok(StatusCode::ACCEPTED)
}

fn expires_in(minutes: u32) -> Duration {
    Duration::from_secs(u64::from(minutes) * 60)
}
