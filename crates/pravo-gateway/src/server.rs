use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use pravo_gigachat::{ChatOrchestrator, FileStore};
use pravo_store::{PersistenceBridge, SqliteStore};
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::router::build_router;

/// Wired application components the gateway serves.
pub struct GatewayComponents {
    pub files: Arc<FileStore>,
    pub store: SqliteStore,
    pub bridge: Arc<PersistenceBridge>,
    pub chat: Arc<ChatOrchestrator>,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub files: Arc<FileStore>,
    pub store: SqliteStore,
    pub bridge: Arc<PersistenceBridge>,
    pub chat: Arc<ChatOrchestrator>,
    pub max_file_size: usize,
    pub started_at: Instant,
}

pub struct GatewayServer {
    addr: SocketAddr,
    max_body_size: usize,
    max_file_size: usize,
    components: GatewayComponents,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        components: GatewayComponents,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("gateway binding to 0.0.0.0 — ensure this is intended for production");
        }

        Self {
            addr,
            max_body_size: 52_428_800,
            max_file_size: pravo_extract::DEFAULT_MAX_FILE_SIZE,
            components,
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    #[must_use]
    pub fn with_max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }

    /// Start the HTTP gateway server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let state = AppState {
            files: self.components.files,
            store: self.components.store,
            bridge: self.components.bridge,
            chat: self.components.chat,
            max_file_size: self.max_file_size,
            started_at: Instant::now(),
        };

        let router = build_router(state, self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("gateway listening on {}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pravo_gigachat::mock::{MockChatApi, MockFileApi};

    async fn components() -> GatewayComponents {
        let file_api = Arc::new(MockFileApi::new());
        let files = Arc::new(FileStore::new(file_api));
        let store = SqliteStore::new(":memory:").await.expect("in-memory store");
        let bridge = Arc::new(PersistenceBridge::new(files.clone(), store.clone()));
        let chat_api = Arc::new(MockChatApi::default());
        let chat = Arc::new(ChatOrchestrator::new(chat_api, files.clone()));
        GatewayComponents {
            files,
            store,
            bridge,
            chat,
        }
    }

    #[tokio::test]
    async fn server_builder_chain() {
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::new("127.0.0.1", 8090, components().await, srx)
            .with_max_body_size(512)
            .with_max_file_size(1024);

        assert_eq!(server.max_body_size, 512);
        assert_eq!(server.max_file_size, 1024);
    }

    #[tokio::test]
    async fn server_invalid_bind_fallback() {
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::new("not_an_ip", 9999, components().await, srx);
        assert_eq!(server.addr.port(), 9999);
    }
}
