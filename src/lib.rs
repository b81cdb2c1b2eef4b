//! tickrelay - backend proxy for the Dida365 / TickTick web API
//!
//! The interesting part is the focus-timer synchronizer in [`focus`]; the
//! rest is a thin HTTP surface and a reqwest client for the upstream.

pub mod config;
pub mod focus;
pub mod remote;
pub mod server;

use anyhow::Context;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::focus::{FocusStateStore, FocusSyncService};
use crate::remote::{DidaClient, FocusTransport};
use crate::server::AppState;

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to install ctrl-c handler: {err}");
    }
    info!("shutdown signal received");
}

/// Composition root: wire the store, the synchronizer, and the client
/// together and serve until interrupted.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let client = Arc::new(DidaClient::new(&config).context("building upstream client")?);
    let transport: Arc<dyn FocusTransport> = client.clone();
    let focus = Arc::new(FocusSyncService::new(FocusStateStore::new(), transport));
    let state = AppState::new(focus, client);

    let app = server::router(state);

    let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}
