//! Classboard device registry
//!
//! Tracks classroom tablets by pairing code. Tablets announce themselves and
//! poll their status; an administrator assigns each one to a classroom.

mod auth;
mod config;
mod error;
mod handlers;
mod server;
mod storage;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "classboard-registry", about = "Classboard tablet registry server")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "registry.toml")]
    config: PathBuf,

    /// Listen address override
    #[arg(short, long)]
    listen: Option<String>,

    /// Database path override
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut cfg = if cli.config.exists() {
        config::RegistryConfig::load(&cli.config)?
    } else {
        tracing::info!("No config file found, using defaults");
        config::RegistryConfig::default()
    };

    if let Some(listen) = cli.listen {
        cfg.listen_addr = listen;
    }
    if let Some(database) = cli.database {
        cfg.storage_path = database;
    }
    if cfg.admin_token.is_none() {
        tracing::warn!("No admin_token configured, admin endpoints are unauthenticated");
    }

    tracing::info!("Starting classboard registry on {}", cfg.listen_addr);

    let storage = storage::RegistryStorage::open(&cfg.storage_path)?;
    let app = server::build_router(storage, &cfg);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
