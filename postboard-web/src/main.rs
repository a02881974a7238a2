//! Postboard Web Server
//!
//! Users, posts and token authentication over HTTP.

use anyhow::Context;
use clap::Parser;
use postboard_core::{init_logging, BoardConfig, StoreBackend};
use postboard_web::PostboardServerBuilder;
use std::path::PathBuf;
use tracing::{error, info};

/// Postboard Web Server - user, post and authentication API
#[derive(Parser)]
#[command(name = "postboard-web")]
#[command(about = "User, post and authentication REST service")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Store backend (memory, mongo)
    #[arg(long)]
    store: Option<StoreBackend>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(args: &Args) -> anyhow::Result<BoardConfig> {
    let config = match &args.config {
        Some(path) => BoardConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => BoardConfig::default(),
    };

    let mut config = config.with_env().context("invalid environment")?;

    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(store) = args.store {
        config.store.backend = store;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    Ok(config)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;

    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    info!("Starting Postboard on http://{}", config.address());

    let server = PostboardServerBuilder::from_config(config)
        .build()
        .await
        .context("failed to build server")?;

    server.start().await.context("server failed")?;

    info!("Server shut down gracefully");
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        eprintln!("postboard-web: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["postboard-web"]);
        assert!(args.port.is_none());
        assert!(args.store.is_none());

        let args = Args::parse_from([
            "postboard-web",
            "--host",
            "0.0.0.0",
            "--port",
            "8000",
            "--store",
            "mongo",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8000));
        assert_eq!(args.store, Some(StoreBackend::Mongo));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_overrides_file_defaults() {
        let args = Args::parse_from(["postboard-web", "--port", "7000", "--store", "memory"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_unknown_store_is_rejected() {
        assert!(Args::try_parse_from(["postboard-web", "--store", "sqlite"]).is_err());
    }
}
