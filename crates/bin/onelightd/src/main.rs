//! # onelightd
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`onelight.toml` plus environment overrides)
//! - Initialise tracing
//! - Open the `SQLite` registry and run migrations
//! - Build the Kasa adapter factory, discovery scanner, and broadcast resolver
//! - Assemble the device manager and the axum router
//! - Bind to a TCP port and serve until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the only crate that depends on every adapter.

mod config;

use std::error::Error;

use onelight_adapter_http_axum::state::AppState;
use onelight_adapter_kasa::{KasaAdapterFactory, KasaScanner};
use onelight_adapter_network::InterfaceBroadcastResolver;
use onelight_app::services::DeviceManager;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Storage
    let registry = config.store().open().await?;

    // Devices and network
    let factory = KasaAdapterFactory::new(&config.kasa);
    let scanner = KasaScanner::new(&config.kasa);
    let resolver = match config.broadcast_target()? {
        Some(target) => InterfaceBroadcastResolver::fixed(target),
        None => InterfaceBroadcastResolver::new(),
    };

    let manager = DeviceManager::new(registry, factory, scanner, resolver);

    // HTTP
    let state = AppState::new(manager, config.discovery_timeout());
    let app = onelight_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "onelightd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("onelightd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
