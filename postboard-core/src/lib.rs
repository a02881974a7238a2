//! Postboard Core - Domain types, errors and ambient configuration
//!
//! This crate holds everything the web layer shares with its storage back ends:
//! accounts, posts, caller identity, the unified error type, configuration
//! loading and logging initialisation.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
