//! Postboard Web Server
//!
//! Binds the listener and serves the router until Ctrl-C.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use postboard_core::{BoardConfig, StoreBackend};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Postboard web server
pub struct PostboardServer {
    config: BoardConfig,
    state: AppState,
}

impl PostboardServer {
    /// Create a server, connecting to the configured store
    pub async fn new(config: BoardConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Bind the configured address and serve until shutdown
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting Postboard Web Server");
        info!("Store backend: {:?}", self.config.store.backend);

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        self.run(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C
    pub async fn run(self, listener: TcpListener) -> WebResult<()> {
        let app = create_app(self.state.clone());

        if let Ok(local) = listener.local_addr() {
            info!("Server listening on http://{}", local);
        }

        let shutdown = async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down...");
        };

        if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown).await {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for PostboardServer
pub struct PostboardServerBuilder {
    config: BoardConfig,
}

impl PostboardServerBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self::from_config(BoardConfig::default())
    }

    /// Start from an existing configuration
    pub fn from_config(config: BoardConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Select the store backend
    pub fn store(mut self, backend: StoreBackend) -> Self {
        self.config.store.backend = backend;
        self
    }

    /// Set the token signing secret
    pub fn secret_key<S: Into<String>>(mut self, secret: S) -> Self {
        self.config.auth.secret_key = secret.into();
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<PostboardServer> {
        PostboardServer::new(self.config).await
    }
}

impl Default for PostboardServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation() {
        let server = PostboardServerBuilder::new().build().await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_builder() {
        let builder = PostboardServerBuilder::new()
            .host("0.0.0.0")
            .port(3000)
            .store(StoreBackend::Memory)
            .secret_key("s3cret");

        assert_eq!(builder.config.server.host, "0.0.0.0");
        assert_eq!(builder.config.server.port, 3000);
        assert_eq!(builder.config.auth.secret_key, "s3cret");
    }

    #[tokio::test]
    async fn test_empty_secret_is_rejected() {
        let result = PostboardServerBuilder::new().secret_key("").build().await;
        assert!(matches!(result, Err(WebError::Board(_))));
    }
}
