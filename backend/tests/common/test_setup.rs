use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::{body::Body, http::Request, response::Response, Extension, Router};
use object_storage::{ObjectStorage, OssConfig, DEFAULT_REGION};
use oss_backend::{routes, types::Environment};
use tower::ServiceExt;
use uuid::Uuid;

/// Endpoint nothing listens on, for tests that must never reach the provider
const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router under test together with the storage client it was built with
pub struct TestSetup {
    pub router: Router,
    pub object_storage: Arc<ObjectStorage>,
    pub http_prefix: String,
}

impl TestSetup {
    /// Router backed by `LocalStack`, `/oss` routes mounted under `http_prefix`
    pub async fn new(http_prefix: &str) -> Self {
        setup_test_env();

        let config = Environment::Development
            .oss_config()
            .expect("Invalid LocalStack configuration");

        Self::with_config(&config, http_prefix, true).await
    }

    /// Router whose storage client points at a closed port
    ///
    /// Any request that reaches the provider fails, so a 400 proves validation ran first.
    pub async fn offline(http_prefix: &str, mount_oss: bool) -> Self {
        let config = OssConfig {
            endpoint: UNREACHABLE_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            access_key: "test".to_string(),
            secret_key: "test".to_string(),
            path_style_access: true,
            chunked_encoding: true,
        };

        Self::with_config(&config, http_prefix, mount_oss).await
    }

    async fn with_config(config: &OssConfig, http_prefix: &str, mount_oss: bool) -> Self {
        let object_storage = Arc::new(
            ObjectStorage::from_config(config)
                .await
                .expect("Failed to build storage client"),
        );

        let mut openapi = OpenApi::default();
        let router = routes::handler(http_prefix, mount_oss)
            .finish_api(&mut openapi)
            .layer(Extension(Arc::new(openapi)))
            .layer(Extension(Environment::Development))
            .layer(Extension(object_storage.clone()));

        Self {
            router,
            object_storage,
            http_prefix: http_prefix.to_string(),
        }
    }

    /// Full route for a path below `/oss`
    pub fn oss_route(&self, path: &str) -> String {
        format!("{}/oss{path}", self.http_prefix)
    }

    pub async fn send_request(
        &self,
        request: Request<Body>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        self.send_request(request).await
    }

    pub async fn send_post_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .body(Body::empty())?;
        self.send_request(request).await
    }

    pub async fn send_delete_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("DELETE")
            .body(Body::empty())?;
        self.send_request(request).await
    }

    /// Sends a multipart upload with a single `field` part
    pub async fn send_multipart_request(
        &self,
        route: &str,
        field: &str,
        file_name: Option<&str>,
        content: &[u8],
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let (content_type, body) = multipart_body(field, file_name, content);
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", content_type)
            .body(Body::from(body))?;
        self.send_request(request).await
    }
}

/// Builds a `multipart/form-data` body holding one part, returns the content type and body
pub fn multipart_body(field: &str, file_name: Option<&str>, content: &[u8]) -> (String, Vec<u8>) {
    let boundary = format!("oss-test-{}", Uuid::new_v4().simple());

    let disposition = file_name.map_or_else(
        || format!("form-data; name=\"{field}\""),
        |name| format!("form-data; name=\"{field}\"; filename=\"{name}\""),
    );

    let mut body = Vec::with_capacity(content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: text/plain\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// Test bucket with a unique name, emptied and removed on drop
pub struct TestBucket {
    pub name: String,
    object_storage: Arc<ObjectStorage>,
}

impl TestBucket {
    /// Picks a fresh bucket name without creating the bucket
    pub fn unique(object_storage: &Arc<ObjectStorage>) -> Self {
        Self {
            name: format!("test-oss-{}", Uuid::new_v4().simple()),
            object_storage: object_storage.clone(),
        }
    }

    /// Creates a fresh bucket directly through the storage client
    pub async fn create(object_storage: &Arc<ObjectStorage>) -> Self {
        let bucket = Self::unique(object_storage);
        object_storage
            .create_bucket(&bucket.name)
            .await
            .expect("Failed to create test bucket");
        bucket
    }
}

impl Drop for TestBucket {
    fn drop(&mut self) {
        let storage = self.object_storage.clone();
        let bucket = self.name.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Ok(objects) = storage.list_objects(&bucket, "").await {
                    for object in objects {
                        let _ = storage.delete_object(&bucket, &object.key).await;
                    }
                }
                let _ = storage.delete_bucket(&bucket).await;
            });
        }
    }
}
