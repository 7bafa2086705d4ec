use anyhow::Context;
use applylog::{
    config::DEFAULT_LOG_FILTER,
    memory::InMemoryStore,
    mongodb::MongoDbStore,
    prelude::*,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::from_env()?;

    match config.store {
        StoreKind::MongoDb => {
            let uri = config
                .mongo_uri
                .as_deref()
                .ok_or(ConfigError::Missing("MONGO_URI"))?;
            let store = MongoDbStore::builder(uri, &config.mongo_database)
                .build()
                .await
                .context("failed to create MongoDB client")?;
            info!(database = %config.mongo_database, "using mongodb store");
            serve(store, &config).await
        }
        StoreKind::Memory => {
            warn!("using in-memory store, records are lost on exit");
            serve(InMemoryStore::new(), &config).await
        }
    }
}

async fn serve<B: StoreBackend + 'static>(backend: B, config: &ServerConfig) -> anyhow::Result<()> {
    let repository = Arc::new(ApplicationRepository::new(DocumentStore::new(backend)));
    match repository.ping().await {
        Ok(()) => info!("document store reachable"),
        Err(e) => warn!(error = %e, "document store not reachable yet"),
    }

    let app = build_router(AppState::new(Arc::clone(&repository), config.max_page_size));
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Job Application Tracker API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match Arc::try_unwrap(repository) {
        Ok(repository) => repository.shutdown().await?,
        Err(_) => warn!("repository still shared at exit, skipping store shutdown"),
    }
    info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
