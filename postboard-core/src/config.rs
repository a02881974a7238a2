//! Configuration management
//!
//! Defaults, then an optional TOML file, then environment variables.

use crate::error::{BoardError, BoardResult, ErrorContext};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixed lifetime of an issued auth token
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

const DEV_SECRET: &str = "postboard-dev-secret-change-me";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BoardConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign auth tokens
    pub secret_key: String,
    /// Token lifetime; only 3600 is accepted
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEV_SECRET.to_string(),
            token_ttl_secs: TOKEN_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Mongo,
}

impl std::str::FromStr for StoreBackend {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            other => Err(config_error(
                format!("Unknown store backend '{}'", other),
                "parse_backend",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongo_uri: String,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database: "task4".to_string(),
        }
    }
}

fn config_error(message: String, operation: &str) -> BoardError {
    BoardError::Config {
        message,
        source: None,
        context: ErrorContext::new("config").with_operation(operation),
    }
}

impl BoardConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> BoardResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BoardError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("read_file"),
        })?;

        toml::from_str(&content).map_err(|e| BoardError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("parse_toml"),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> BoardResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| BoardError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| BoardError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("write_file"),
        })
    }

    /// Overlay values from the process environment
    pub fn with_env(self) -> BoardResult<Self> {
        self.with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable source.
    ///
    /// Recognised: `POSTBOARD_HOST`, `POSTBOARD_PORT`, `SECRET_KEY`,
    /// `POSTBOARD_STORE`, `MONGO_URI`, `MONGO_SERVER_NAME`, `MONGO_USER_NAME`,
    /// `MONGO_PASSWORD`, `MONGO_DATABASE`.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> BoardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("POSTBOARD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("POSTBOARD_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| config_error(format!("Invalid POSTBOARD_PORT '{}'", port), "env"))?;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.auth.secret_key = secret;
        }
        if let Some(backend) = lookup("POSTBOARD_STORE") {
            self.store.backend = backend.parse()?;
        }
        if let Some(database) = lookup("MONGO_DATABASE") {
            self.store.database = database;
        }

        if let Some(uri) = lookup("MONGO_URI") {
            self.store.mongo_uri = uri;
        } else if let Some(server) = lookup("MONGO_SERVER_NAME") {
            let credentials = match (lookup("MONGO_USER_NAME"), lookup("MONGO_PASSWORD")) {
                (Some(user), Some(password)) => format!("{}:{}@", user, password),
                _ => String::new(),
            };
            self.store.mongo_uri = format!(
                "mongodb://{}{}:27017/{}?authSource=admin",
                credentials, server, self.store.database
            );
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> BoardResult<()> {
        if self.auth.secret_key.is_empty() {
            return Err(config_error(
                "auth.secret_key must not be empty".to_string(),
                "validate",
            ));
        }

        if self.auth.token_ttl_secs != TOKEN_LIFETIME_SECS {
            return Err(config_error(
                format!(
                    "auth.token_ttl_secs must be {} (got {})",
                    TOKEN_LIFETIME_SECS, self.auth.token_ttl_secs
                ),
                "validate",
            ));
        }

        if self.store.backend == StoreBackend::Mongo && self.store.mongo_uri.is_empty() {
            return Err(config_error(
                "store.mongo_uri is required for the mongo backend".to_string(),
                "validate",
            ));
        }

        Ok(())
    }

    /// True when the signing secret is still the built-in development value
    pub fn uses_dev_secret(&self) -> bool {
        self.auth.secret_key == DEV_SECRET
    }

    /// Server bind address
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
