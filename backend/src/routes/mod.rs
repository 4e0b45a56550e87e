/// Liveness endpoint
pub mod health;
/// Bucket and object endpoints
pub mod oss;

use std::sync::Arc;

use aide::{
    axum::{routing::get as api_get, ApiRouter},
    openapi::OpenApi,
    scalar::Scalar,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json,
};

use crate::types::Environment;

/// Creates the router with all handler routes
///
/// The `/oss` endpoints are only mounted when `mount_oss` is set. `http_prefix` is
/// prepended to each of them.
pub fn handler(http_prefix: &str, mount_oss: bool) -> ApiRouter {
    let scalar = Scalar::new("/openapi.json").with_title("Object Storage Gateway Docs");

    let router = ApiRouter::new()
        .route("/docs", scalar.axum_route())
        .route("/openapi.json", get(openapi_schema))
        .api_route("/health", api_get(health::handler));

    if mount_oss {
        router.merge(oss::handler(http_prefix))
    } else {
        router
    }
}

/// Serves the generated `OpenAPI` document outside production
#[allow(clippy::unused_async)]
async fn openapi_schema(
    Extension(environment): Extension<Environment>,
    Extension(openapi): Extension<Arc<OpenApi>>,
) -> Response {
    if !environment.show_api_docs() {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(openapi.as_ref()).into_response()
}
