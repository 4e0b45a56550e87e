//! REST facade over the object storage client
//!
//! Every handler validates its path parameters and forwards to a single
//! [`object_storage::ObjectStorage`] call.

/// Bucket handlers
pub mod bucket;
/// Object handlers
pub mod object;

use std::sync::LazyLock;

use aide::axum::{
    routing::{delete, get, post},
    ApiRouter,
};
use axum::extract::DefaultBodyLimit;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Largest accepted multipart upload body: 100 MiB
pub const MAX_UPLOAD_SIZE_BYTES: usize = 100 * 1024 * 1024;

/// Longest S3 object key, in UTF-8 bytes
pub const MAX_OBJECT_NAME_BYTES: usize = 1024;

/// Longest signed URL lifetime in minutes (7 days, the SigV4 limit)
pub const MAX_PRESIGNED_URL_EXPIRY_MINUTES: u32 = 7 * 24 * 60;

/// S3 bucket naming rule: 3-63 lowercase letters, digits, dots and hyphens,
/// starting and ending with a letter or digit
static BUCKET_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").expect("Invalid bucket name regex")
});

/// Path parameters addressing a bucket
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct BucketPath {
    /// Bucket name
    #[validate(regex(path = *BUCKET_NAME_REGEX, code = "invalid_bucket_name"))]
    pub bucket_name: String,
}

/// Path parameters addressing an object (or a key prefix)
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct ObjectPath {
    /// Bucket name
    #[validate(regex(path = *BUCKET_NAME_REGEX, code = "invalid_bucket_name"))]
    pub bucket_name: String,
    /// Object key. Percent-encode `/` to address nested keys.
    #[validate(custom(function = "validate_object_name"))]
    pub object_name: String,
}

/// Path parameters for signed URL generation
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct PresignPath {
    /// Bucket name
    #[validate(regex(path = *BUCKET_NAME_REGEX, code = "invalid_bucket_name"))]
    pub bucket_name: String,
    /// Object key. Percent-encode `/` to address nested keys.
    #[validate(custom(function = "validate_object_name"))]
    pub object_name: String,
    /// URL lifetime in minutes
    #[validate(range(min = 1, max = MAX_PRESIGNED_URL_EXPIRY_MINUTES, code = "invalid_expires"))]
    pub expires: u32,
}

/// Creates the router for bucket and object endpoints under `{http_prefix}/oss`
pub fn handler(http_prefix: &str) -> ApiRouter {
    let bucket_root = format!("{http_prefix}/oss/bucket");
    let object_root = format!("{http_prefix}/oss/object");

    ApiRouter::new()
        .api_route(&bucket_root, get(bucket::list_buckets))
        .api_route(
            &format!("{bucket_root}/{{bucket_name}}"),
            get(bucket::get_bucket)
                .post(bucket::create_bucket)
                .delete(bucket::delete_bucket),
        )
        .api_route(
            &format!("{object_root}/{{bucket_name}}"),
            post(object::upload_object_named_by_file),
        )
        .api_route(
            &format!("{object_root}/{{bucket_name}}/{{object_name}}"),
            get(object::list_objects)
                .post(object::upload_object)
                .delete(object::delete_object),
        )
        .api_route(
            &format!("{object_root}/{{bucket_name}}/{{object_name}}/"),
            delete(object::delete_object),
        )
        .api_route(
            &format!("{object_root}/{{bucket_name}}/{{object_name}}/{{expires}}"),
            get(object::presigned_get_url),
        )
        .api_route(
            &format!("{object_root}/put/{{bucket_name}}/{{object_name}}/{{expires}}"),
            get(object::presigned_put_url),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
}

// Object keys must be non-blank and fit the S3 key limit in bytes
fn validate_object_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() || name.len() > MAX_OBJECT_NAME_BYTES {
        let mut error = ValidationError::new("invalid_object_name");
        error.message = Some(std::borrow::Cow::Borrowed(
            "Object name must be non-blank and at most 1024 bytes",
        ));
        return Err(error);
    }
    Ok(())
}

/// Formats a timestamp as ISO-8601 UTC with millisecond precision
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats an optional provider timestamp as ISO-8601 UTC
fn to_rfc3339(timestamp: Option<DateTime<Utc>>) -> Option<String> {
    timestamp.map(format_timestamp)
}
