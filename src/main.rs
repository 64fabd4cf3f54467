use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use pravo_gateway::{GatewayComponents, GatewayServer};
use pravo_gigachat::{ChatOrchestrator, FileStore, GigaChatClient};
use pravo_store::{PersistenceBridge, SqliteStore};
use tokio::sync::watch;

mod config;

use config::Config;

fn resolve_config_path() -> PathBuf {
    std::env::var("PRAVO_CONFIG").map_or_else(|_| PathBuf::from("pravo.toml"), PathBuf::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = resolve_config_path();
    let config = Config::load(&config_path)?;
    config.validate()?;

    if let Some(parent) = std::path::Path::new(&config.store.path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("failed to create store directory")?;
    }
    let store = SqliteStore::new(&config.store.path)
        .await
        .context("failed to open document store")?;

    let client = Arc::new(
        GigaChatClient::new(config.gigachat.credentials.clone(), config.gigachat.scope.clone())
            .with_base_url(config.gigachat.base_url.clone())
            .with_auth_url(config.gigachat.auth_url.clone())
            .with_model(config.gigachat.model.clone()),
    );

    let files = Arc::new(FileStore::new(client.clone()));
    let bridge = Arc::new(PersistenceBridge::new(files.clone(), store.clone()));
    let chat = Arc::new(
        ChatOrchestrator::new(client, files.clone()).with_model(config.gigachat.model.clone()),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let components = GatewayComponents {
        files,
        store,
        bridge,
        chat,
    };

    GatewayServer::new(
        &config.gateway.bind,
        config.gateway.port,
        components,
        shutdown_rx,
    )
    .with_max_body_size(config.gateway.max_body_size)
    .with_max_file_size(config.extract.max_file_size)
    .serve()
    .await
    .context("gateway server failed")?;

    Ok(())
}
