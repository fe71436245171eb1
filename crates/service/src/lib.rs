//! RidersAid service - HTTP daemon for emergency medical profiles
//!
//! Wires the emergency core to an axum router: the identity provider turns
//! bearer sessions into identities, the owner routes act on the caller's own
//! profile, and `/e/{token}` serves the public emergency view.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod extract;
pub mod identity;
pub mod observability;
pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub use config::ServiceConfig;
pub use error::{ApiError, ErrorBody};
pub use identity::{IdentityProvider, MemoryIdentityProvider, Session};
pub use observability::init_logging;
pub use routes::router;
pub use state::AppState;

/// Run the HTTP service until Ctrl-C.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let addr = config.http.bind;
    let state = AppState::from_config(config)
        .await
        .context("Failed to open record store")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind HTTP listener")?;

    info!("RidersAid service listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("RidersAid service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
