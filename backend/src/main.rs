use std::sync::Arc;

use object_storage::ObjectStorage;
use oss_backend::{server, types::Environment};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let filter = EnvFilter::builder()
        .with_default_directive(environment.tracing_level().into())
        .from_env_lossy();

    // JSON logs for staging/production, human readable for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(filter).init();
        }
        Environment::Development => {
            fmt().with_env_filter(filter).init();
        }
    }

    let object_storage = if environment.oss_enabled() {
        let config = environment.oss_config()?;
        Some(Arc::new(ObjectStorage::from_config(&config).await?))
    } else {
        tracing::info!("Object storage disabled (OSS_ENABLE=false)");
        None
    };

    if environment.oss_info() && object_storage.is_none() {
        anyhow::bail!("OSS_INFO requires OSS_ENABLE: the /oss endpoints need a storage client");
    }

    server::start(environment, object_storage).await
}
