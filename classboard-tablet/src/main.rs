//! Classboard tablet agent
//!
//! Announces this tablet to the registry under its pairing code, waits for an
//! administrator to assign it to a classroom, then keeps the classroom
//! display on screen until the assignment is withdrawn.

mod navigator;

use anyhow::{Context, Result};
use clap::Parser;
use classboard_core::{
    ensure_identity, DisplayWatchdog, FileIdentityStore, PairingOutcome, PairingSession,
    PollState, RegistryApi, RegistryClient, TabletConfig,
};
use navigator::BrowserNavigator;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "classboard-tablet", version, about = "Classboard tablet agent")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Registry URL override
    #[arg(short, long)]
    registry_url: Option<String>,

    /// Identity file override
    #[arg(short, long)]
    identity: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    info!("Starting Classboard tablet v{}", VERSION);

    let store = FileIdentityStore::new(config.identity_path());
    let identity = ensure_identity(&store)
        .with_context(|| format!("Failed to load device identity from {:?}", store.path()))?;
    info!("Pairing code: {}", identity);

    let api: Arc<dyn RegistryApi> = Arc::new(RegistryClient::new(
        &config.registry_url,
        config.request_timeout(),
    )?);
    let navigator = Arc::new(BrowserNavigator::new(
        config.display_base()?,
        config.browser_command.clone(),
    ));

    tokio::select! {
        _ = run(&config, api, navigator, identity.id.clone()) => {}
        _ = signal::ctrl_c() => info!("Received shutdown signal"),
    }

    info!("Tablet agent stopped");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<TabletConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(classboard_core::get_default_config_path);

    let mut config = if path.exists() {
        TabletConfig::load(&path)?
    } else {
        info!("No config file at {:?}, using defaults", path);
        TabletConfig::default()
    };

    if let Some(url) = &cli.registry_url {
        config.registry_url = url.clone();
    }
    if let Some(identity) = &cli.identity {
        config.identity_path = Some(identity.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Pair, display, and pair again whenever the registry withdraws the
/// assignment. Only returns if a pairing session is cancelled.
async fn run(
    config: &TabletConfig,
    api: Arc<dyn RegistryApi>,
    navigator: Arc<BrowserNavigator>,
    device_id: String,
) {
    loop {
        let handle = PairingSession::new(api.clone(), navigator.clone(), device_id.clone())
            .with_poll_interval(config.poll_interval())
            .spawn();

        let mut view = handle.subscribe();
        let reporter = tokio::spawn(async move {
            while view.changed().await.is_ok() {
                let current = view.borrow_and_update().clone();
                match (&current.state, &current.error) {
                    (_, Some(hint)) => warn!("Pairing: {}", hint),
                    (PollState::Pending, None) => info!("Waiting for classroom assignment"),
                    _ => {}
                }
            }
        });

        let outcome = handle.wait().await;
        reporter.abort();

        let route = match outcome {
            PairingOutcome::Activated(route) => route,
            PairingOutcome::Cancelled => return,
        };

        let watchdog = DisplayWatchdog::new(api.clone(), navigator.clone(), device_id.clone())
            .with_interval(config.watch_interval());
        let last = watchdog.run(route).await;
        info!("Left display {}, pairing again", last);
    }
}
