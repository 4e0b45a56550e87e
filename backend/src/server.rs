use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::Extension;
use object_storage::ObjectStorage;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{routes, types::Environment};

/// Starts the server with the given environment and storage client
///
/// The `/oss` endpoints are mounted when `OSS_INFO` is set; the caller guarantees a
/// storage client is present in that case.
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    object_storage: Option<Arc<ObjectStorage>>,
) -> anyhow::Result<()> {
    let mut openapi = OpenApi::default();
    let http_prefix = environment.http_prefix();
    let mount_oss = environment.oss_info() && object_storage.is_some();

    let mut router = routes::handler(&http_prefix, mount_oss)
        .finish_api(&mut openapi)
        .layer(Extension(Arc::new(openapi)))
        .layer(Extension(environment));

    if let Some(object_storage) = object_storage {
        router = router.layer(Extension(object_storage));
    }

    let router = router.layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Object storage gateway started on http://{addr}{http_prefix}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
