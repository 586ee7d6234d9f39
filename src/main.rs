use clap::Parser;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ifcb_roi::{
    Config, Pid, RoiService,
    config::{BackendConfig, ObjectStoreConfig},
    handlers::{AppState, create_router},
    storage::{AccessGuard, Base64Store, BinDirStore, Store},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Create storage backend
    let backend = config.backend()?;
    let store: Arc<dyn Store<Pid>> = match &backend {
        BackendConfig::BinDirectory(dir) => {
            tracing::info!("Data directory: {:?}", dir);
            Arc::new(AccessGuard::read_only(Base64Store::new(BinDirStore::new(
                dir.clone(),
            ))))
        }
        BackendConfig::ObjectStore(s3) => {
            tracing::info!(
                bucket = %s3.bucket,
                endpoint = s3.endpoint_url.as_deref().unwrap_or("default"),
                prefix = %s3.prefix,
                "Using S3 object store"
            );
            object_store(s3).await?
        }
    };

    let state = AppState {
        service: RoiService::new(store),
        backend: backend.kind(),
    };

    let app = create_router(state);
    let app = if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting ifcb-roi server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "s3")]
async fn object_store(s3: &ObjectStoreConfig) -> anyhow::Result<Arc<dyn Store<Pid>>> {
    use ifcb_roi::storage::{KeyedRoiStore, S3Settings, S3Store};
    use std::time::Duration;

    let client = S3Store::new(S3Settings {
        bucket: s3.bucket.clone(),
        endpoint_url: s3.endpoint_url.clone(),
        access_key: s3.access_key.clone(),
        secret_key: s3.secret_key.clone(),
        region: s3.region.clone(),
        timeout: Duration::from_secs(s3.timeout_secs),
    })
    .await?;

    Ok(Arc::new(AccessGuard::read_write(Base64Store::new(
        KeyedRoiStore::new(client, s3.prefix.clone()),
    ))))
}

#[cfg(not(feature = "s3"))]
async fn object_store(_s3: &ObjectStoreConfig) -> anyhow::Result<Arc<dyn Store<Pid>>> {
    anyhow::bail!("S3_BUCKET_NAME is set but this build lacks the `s3` feature")
}
