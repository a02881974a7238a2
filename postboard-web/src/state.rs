//! Shared application state

use crate::{
    auth::TokenCodec,
    store::{Directory, MemoryDirectory},
    WebResult,
};
use postboard_core::{BoardConfig, StoreBackend};
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(feature = "mongo")]
use crate::store::MongoDirectory;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: BoardConfig,
    /// Token issuing and verification
    pub codec: Arc<TokenCodec>,
    /// Account and post storage
    pub directory: Arc<dyn Directory>,
}

impl AppState {
    /// Create the state, connecting to the configured store
    pub async fn new(config: BoardConfig) -> WebResult<Self> {
        config.validate()?;

        if config.uses_dev_secret() {
            warn!("SECRET_KEY is not set; tokens are signed with the development secret");
        }

        let directory: Arc<dyn Directory> = match config.store.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Arc::new(MemoryDirectory::new())
            }
            #[cfg(feature = "mongo")]
            StoreBackend::Mongo => Arc::new(
                MongoDirectory::connect(&config.store.mongo_uri, &config.store.database).await?,
            ),
            #[cfg(not(feature = "mongo"))]
            StoreBackend::Mongo => {
                return Err(postboard_core::BoardError::Config {
                    message: "built without the `mongo` feature".to_string(),
                    source: None,
                    context: postboard_core::ErrorContext::new("state"),
                }
                .into())
            }
        };

        let state = Self::with_directory(config, directory);
        info!("Application state initialized successfully");
        Ok(state)
    }

    /// Create the state around an existing directory
    pub fn with_directory(config: BoardConfig, directory: Arc<dyn Directory>) -> Self {
        let codec = Arc::new(TokenCodec::new(&config.auth.secret_key));
        Self {
            config,
            codec,
            directory,
        }
    }

    /// In-memory state with default configuration
    pub fn in_memory() -> Self {
        Self::with_directory(BoardConfig::default(), Arc::new(MemoryDirectory::new()))
    }
}
