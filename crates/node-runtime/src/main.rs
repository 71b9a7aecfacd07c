//! # Anchors Node Runtime
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber (`RUST_LOG`, default `info`)
//! 2. Load configuration (file, then environment)
//! 3. Load genesis and open the chaindata store
//! 4. Bootstrap the epoch state and wire the services
//! 5. Spawn the proposer, collector, liveness monitor and rotation loop
//!
//! The process exits non-zero if the epoch rotation loop stops: its only
//! exit is a failed atomic commit, after which state on disk and in memory
//! may disagree.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::adapters::{open_store, HttpPeerClient};
use node_runtime::{load_config, load_genesis, AnchorsNode, Peers};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config()?;
    let identity = config.identity()?;
    let genesis = load_genesis(&config.genesis_path)?;
    let store = open_store(&config.storage)?;

    let client = Arc::new(HttpPeerClient::new(config.network.proof_request_timeout)?);
    let node = AnchorsNode::assemble(config, identity, store, &genesis, Peers::uniform(client))?;

    info!("===========================================");
    info!("  Anchors Node v{}", env!("CARGO_PKG_VERSION"));
    info!("  Network: {}", genesis.network_id);
    info!("  Validator: {}", node.validator_id);
    info!("===========================================");

    let mut tasks = node.spawn_background_tasks();
    tokio::select! {
        fatal = tasks.rotation_failure() => {
            error!(error = %format!("{fatal:#}"), "Fatal consensus error, halting");
            tasks.abort_all();
            std::process::exit(1);
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received");
            tasks.abort_all();
        }
    }

    Ok(())
}
