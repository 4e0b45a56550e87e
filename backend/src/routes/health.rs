use std::sync::Arc;

use aide::axum::IntoApiResponse;
use axum::{Extension, Json};
use object_storage::ObjectStorage;
use schemars::JsonSchema;
use serde::Serialize;

/// Health check payload
#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    status: String,
    /// Current version of the application
    semver: String,
    /// Commit hash of the current build (if available)
    rev: Option<String>,
    /// Whether an object storage client is configured
    storage_enabled: bool,
}

/// Health check endpoint
///
/// Reports version information and whether the object storage client was built at startup.
/// No call is made to the storage provider.
pub async fn handler(
    object_storage: Option<Extension<Arc<ObjectStorage>>>,
) -> impl IntoApiResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        semver: env!("CARGO_PKG_VERSION").to_string(),
        rev: option_env!("GIT_REV").map(ToString::to_string),
        storage_enabled: object_storage.is_some(),
    })
}
