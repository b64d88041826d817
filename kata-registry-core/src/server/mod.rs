//! Registry server - serve the built index behind the Access Gate
//!
//! Endpoints, with the registry mounted at the gate prefix (`/r` by default):
//! - `GET /health` - liveness, outside the gate
//! - `GET /r/index[.json]` - agent discovery index
//! - `GET /r/index-compact[.json]` - compact discovery index
//! - `GET /r/component-index.json` - the full `ComponentIndexEntry[]`
//! - `GET /r/{name}[.json]` - registry item for one component

mod routes;
mod store;

pub use routes::NotFoundBody;
pub use store::{RegistrySnapshot, RegistryStore};

use anyhow::{Context, Result};
use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::gate::{require_token, AccessGate};

/// Build the router; every route sits behind the gate, which itself decides
/// which paths it guards. Registry files are served under the gate's prefix
/// so a guarded prefix can never miss them.
pub fn router(store: Arc<RegistryStore>, gate: AccessGate) -> Router {
    let registry_route = format!("{}/:file", gate.prefix().trim_end_matches('/'));

    Router::new()
        .route("/health", get(routes::health))
        .route(&registry_route, get(routes::registry_file))
        .with_state(store)
        .layer(middleware::from_fn_with_state(Arc::new(gate), require_token))
}

/// Bind and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Registry server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Registry server failed")?;

    info!("Registry server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed
        std::future::pending::<()>().await;
    }
}
