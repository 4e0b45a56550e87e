//! Object operations

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{debug, info};

use crate::{to_utc, ObjectStorage, StorageError, StorageResult};

/// Entry of an object listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: Option<i64>,
    /// Entity tag, quoted as returned by the provider
    pub etag: Option<String>,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// Storage class, e.g. `STANDARD`
    pub storage_class: Option<String>,
}

impl From<&aws_sdk_s3::types::Object> for ObjectSummary {
    fn from(object: &aws_sdk_s3::types::Object) -> Self {
        Self {
            key: object.key().unwrap_or_default().to_string(),
            size: object.size(),
            etag: object.e_tag().map(ToString::to_string),
            last_modified: object.last_modified().and_then(to_utc),
            storage_class: object.storage_class().map(|class| class.as_str().to_string()),
        }
    }
}

/// Object metadata read back from the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Bucket holding the object
    pub bucket: String,
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: Option<i64>,
    /// Entity tag
    pub etag: Option<String>,
    /// Content type stored with the object
    pub content_type: Option<String>,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// Storage class, absent for `STANDARD` on most providers
    pub storage_class: Option<String>,
}

/// Object metadata together with its content
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Object metadata
    pub info: ObjectInfo,
    /// Full object content
    pub content: Bytes,
}

impl ObjectStorage {
    /// Uploads an object in a single request
    ///
    /// # Arguments
    ///
    /// * `bucket_name` - Target bucket
    /// * `key` - Object key
    /// * `content` - Object content, its length is sent as `Content-Length`
    /// * `content_type` - MIME type, defaults to `application/octet-stream`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BucketNotFound` if the bucket does not exist
    /// Returns `StorageError` for any other provider failure
    pub async fn put_object(
        &self,
        bucket_name: &str,
        key: &str,
        content: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<()> {
        let content_length = i64::try_from(content.len()).map_err(|_| {
            StorageError::InvalidInput(format!("Object too large: {} bytes", content.len()))
        })?;
        let content_type = content_type.unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref());

        debug!("Uploading object {bucket_name}/{key} ({content_length} bytes, {content_type})");

        self.s3_client
            .put_object()
            .bucket(bucket_name)
            .key(key)
            .content_length(content_length)
            .content_type(content_type)
            .body(ByteStream::from(content))
            .send()
            .await?;

        info!("Uploaded object {bucket_name}/{key}");
        Ok(())
    }

    /// Reads object metadata without fetching the content
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ObjectNotFound` if the object does not exist
    pub async fn get_object_info(
        &self,
        bucket_name: &str,
        key: &str,
    ) -> StorageResult<ObjectInfo> {
        let output = self
            .s3_client
            .head_object()
            .bucket(bucket_name)
            .key(key)
            .send()
            .await?;

        Ok(ObjectInfo {
            bucket: bucket_name.to_string(),
            key: key.to_string(),
            size: output.content_length(),
            etag: output.e_tag().map(ToString::to_string),
            content_type: output.content_type().map(ToString::to_string),
            last_modified: output.last_modified().and_then(to_utc),
            storage_class: output.storage_class().map(|class| class.as_str().to_string()),
        })
    }

    /// Fetches an object with its content
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ObjectNotFound` if the object does not exist
    /// Returns `StorageError::AwsError` if the body cannot be read
    pub async fn get_object(&self, bucket_name: &str, key: &str) -> StorageResult<StoredObject> {
        let output = self
            .s3_client
            .get_object()
            .bucket(bucket_name)
            .key(key)
            .send()
            .await?;

        let info = ObjectInfo {
            bucket: bucket_name.to_string(),
            key: key.to_string(),
            size: output.content_length(),
            etag: output.e_tag().map(ToString::to_string),
            content_type: output.content_type().map(ToString::to_string),
            last_modified: output.last_modified().and_then(to_utc),
            storage_class: output.storage_class().map(|class| class.as_str().to_string()),
        };
        let content = output.body.collect().await?.into_bytes();

        Ok(StoredObject { info, content })
    }

    /// Lists every object whose key starts with `prefix`, following continuation tokens
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BucketNotFound` if the bucket does not exist
    pub async fn list_objects(
        &self,
        bucket_name: &str,
        prefix: &str,
    ) -> StorageResult<Vec<ObjectSummary>> {
        let pages = self
            .s3_client
            .list_objects_v2()
            .bucket(bucket_name)
            .prefix(prefix)
            .into_paginator()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        let objects: Vec<ObjectSummary> = pages
            .iter()
            .flat_map(|page| page.contents())
            .map(ObjectSummary::from)
            .collect();

        debug!(
            "Listed {} objects in {bucket_name} with prefix {prefix:?}",
            objects.len()
        );

        Ok(objects)
    }

    /// Deletes an object. Deleting a missing key succeeds, as it does on S3.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BucketNotFound` if the bucket does not exist
    pub async fn delete_object(&self, bucket_name: &str, key: &str) -> StorageResult<()> {
        self.s3_client
            .delete_object()
            .bucket(bucket_name)
            .key(key)
            .send()
            .await?;

        info!("Deleted object {bucket_name}/{key}");
        Ok(())
    }

    /// Unsigned URL of an object
    ///
    /// Only usable when the bucket allows anonymous reads. Path-style configurations yield
    /// `endpoint/bucket/key`, virtual-hosted ones `bucket.host/key`. Key segments are
    /// percent-encoded, `/` separators are kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConfigError` if the endpoint cannot carry a path or host
    pub fn object_url(&self, bucket_name: &str, key: &str) -> StorageResult<String> {
        let mut url = self.endpoint.clone();

        if !self.path_style_access {
            let host = url.host_str().ok_or_else(|| {
                StorageError::ConfigError(format!("Endpoint has no host: {}", self.endpoint))
            })?;
            let virtual_host = format!("{bucket_name}.{host}");
            url.set_host(Some(&virtual_host)).map_err(|e| {
                StorageError::InvalidInput(format!("Invalid bucket host {virtual_host}: {e}"))
            })?;
        }

        if url.cannot_be_a_base() {
            return Err(StorageError::ConfigError(format!(
                "Endpoint cannot be a base: {}",
                self.endpoint
            )));
        }
        url.set_query(None);
        url.set_fragment(None);

        // Assembled by hand: `Url` would resolve `.` and `..` key segments away
        let mut object_url = url.as_str().trim_end_matches('/').to_string();
        if self.path_style_access {
            object_url.push('/');
            object_url.push_str(&encode_path_segment(bucket_name));
        }
        for segment in key.split('/') {
            object_url.push('/');
            object_url.push_str(&encode_path_segment(segment));
        }

        Ok(object_url)
    }
}

/// Characters escaped inside one URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_path_segment(segment: &str) -> String {
    match segment {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => utf8_percent_encode(segment, PATH_SEGMENT).to_string(),
    }
}
