//! HTTP server for guide-nav
//!
//! Exposes the navigation core to a host map widget as a JSON API.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::nav::{AmapServices, NavServices};
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Start the HTTP server with the AMap-backed services
///
/// Never returns unless the server shuts down
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    let services = AmapServices::from_config(&config)?;
    let state = Arc::new(AppState::from_config(config, services)?);
    run_on(&addr, state).await
}

/// Start the HTTP server on a specific address with prepared state
pub async fn run_on<S: NavServices>(addr: &str, state: Arc<AppState<S>>) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    spawn_initial_fixes(state.clone());
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}

/// Locate the user and the guide stick in the background
fn spawn_initial_fixes<S: NavServices>(state: Arc<AppState<S>>) {
    let user = state.clone();
    tokio::spawn(async move {
        if let Err(e) = user.navigator.locate_user().await {
            warn!(error = %e, "Initial user fix failed");
        }
    });

    tokio::spawn(async move {
        if let Err(e) = state.navigator.locate_device().await {
            warn!(error = %e, "Initial device fix failed");
        }
    });
}
