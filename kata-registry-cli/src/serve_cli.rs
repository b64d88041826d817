//! `kata-registry serve`

use anyhow::{Context, Result};
use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use kata_registry_core::gate::{AccessGate, GateConfig, TOKEN_ENV};
use kata_registry_core::server::{self, RegistrySnapshot, RegistryStore};

use crate::project::Project;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[clap(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Expected x-registry-token value (defaults to $REGISTRY_TOKEN)
    #[clap(long)]
    pub token: Option<String>,

    /// Rebuild the index every N seconds and serve the result when it changes
    #[clap(long, value_name = "SECONDS")]
    pub rebuild_interval: Option<u64>,
}

impl ServeArgs {
    fn gate_config(&self, prefix: &str) -> GateConfig {
        let config = match &self.token {
            Some(token) => GateConfig::new(Some(token.clone())),
            None => GateConfig::from_env(),
        };
        config.with_prefix(prefix)
    }
}

pub async fn execute(project: &Project, args: ServeArgs) -> Result<()> {
    let output = project.build().await?;
    let snapshot = RegistrySnapshot::from_build(&output).context("Failed to render artifacts")?;
    let store = Arc::new(RegistryStore::new(snapshot));

    let gate = AccessGate::new(args.gate_config(&project.config.gate_prefix));
    if gate.is_open() {
        warn!(
            "No token configured (--token or {}); {} is open to everyone",
            TOKEN_ENV,
            gate.prefix()
        );
    } else {
        info!("Access gate guarding {}", gate.prefix());
    }

    if let Some(seconds) = args.rebuild_interval.filter(|s| *s > 0) {
        tokio::spawn(rebuild_loop(
            project.clone(),
            Arc::clone(&store),
            Duration::from_secs(seconds),
        ));
    }

    info!("Serving {} components", output.index.len());
    server::serve(args.bind, server::router(store, gate)).await
}

/// Periodically rebuild; a failed build keeps the previous snapshot
async fn rebuild_loop(project: Project, store: Arc<RegistryStore>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let snapshot = match project.build().await {
            Ok(output) => match RegistrySnapshot::from_build(&output) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    error!("Failed to render rebuilt index: {e}");
                    continue;
                }
            },
            Err(e) => {
                error!("Rebuild failed, still serving the previous index: {e:#}");
                continue;
            }
        };

        if store.replace_if_changed(snapshot).await {
            info!("Registry index changed; new snapshot in service");
        }
    }
}
