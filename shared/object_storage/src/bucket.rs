//! Bucket operations

use aws_sdk_s3::{
    error::SdkError,
    operation::head_bucket::HeadBucketError,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{to_utc, ObjectStorage, StorageResult, DEFAULT_REGION};

/// Bucket as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Bucket name
    pub name: String,
    /// Creation time, when the provider reports it
    pub creation_date: Option<DateTime<Utc>>,
}

impl From<&aws_sdk_s3::types::Bucket> for Bucket {
    fn from(bucket: &aws_sdk_s3::types::Bucket) -> Self {
        Self {
            name: bucket.name().unwrap_or_default().to_string(),
            creation_date: bucket.creation_date().and_then(to_utc),
        }
    }
}

impl ObjectStorage {
    /// Checks if a bucket exists and is accessible with the configured credentials
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for any provider failure other than "not found"
    pub async fn bucket_exists(&self, bucket_name: &str) -> StorageResult<bool> {
        let result = self
            .s3_client
            .head_bucket()
            .bucket(bucket_name)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadBucketError::NotFound(_)) =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Creates a bucket unless it already exists
    ///
    /// Outside `us-east-1` the bucket is created with a matching location constraint.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the existence check or the create call fails
    pub async fn create_bucket(&self, bucket_name: &str) -> StorageResult<()> {
        if self.bucket_exists(bucket_name).await? {
            debug!("Bucket already exists: {bucket_name}");
            return Ok(());
        }

        let mut request = self.s3_client.create_bucket().bucket(bucket_name);

        if let Some(region) = self.s3_client.config().region() {
            if region.as_ref() != DEFAULT_REGION {
                let constraint = BucketLocationConstraint::from(region.as_ref());
                request = request.create_bucket_configuration(
                    CreateBucketConfiguration::builder()
                        .location_constraint(constraint)
                        .build(),
                );
            }
        }

        match request.send().await {
            Ok(_) => {
                info!("Created bucket: {bucket_name}");
                Ok(())
            }
            // Lost a race with a concurrent create of the same bucket
            Err(SdkError::ServiceError(service_err))
                if service_err.err().is_bucket_already_owned_by_you() =>
            {
                debug!("Bucket already owned: {bucket_name}");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lists all buckets owned by the configured credentials
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the provider call fails
    pub async fn list_buckets(&self) -> StorageResult<Vec<Bucket>> {
        let output = self.s3_client.list_buckets().send().await?;

        Ok(output.buckets().iter().map(Bucket::from).collect())
    }

    /// Looks up a bucket by name
    ///
    /// The listing is narrowed server-side with `prefix`. The exact-name filter keeps the
    /// result correct on providers that ignore the prefix parameter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the provider call fails
    pub async fn get_bucket(&self, bucket_name: &str) -> StorageResult<Option<Bucket>> {
        let output = self
            .s3_client
            .list_buckets()
            .prefix(bucket_name)
            .send()
            .await?;

        Ok(output
            .buckets()
            .iter()
            .find(|bucket| bucket.name() == Some(bucket_name))
            .map(Bucket::from))
    }

    /// Deletes a bucket. The provider rejects the call if the bucket still holds objects.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BucketNotFound` if the bucket does not exist
    /// Returns `StorageError::BucketNotEmpty` if the bucket still holds objects
    pub async fn delete_bucket(&self, bucket_name: &str) -> StorageResult<()> {
        self.s3_client
            .delete_bucket()
            .bucket(bucket_name)
            .send()
            .await?;

        info!("Deleted bucket: {bucket_name}");
        Ok(())
    }
}
