//! # Node Configuration
//!
//! Defaults, then an optional JSON file (`ANCHORS_CONFIG_PATH`), then
//! environment variables. Invalid values are warned about and ignored.
//!
//! | Variable | Effect |
//! |---|---|
//! | `ANCHORS_CONFIG_PATH` | JSON file with any subset of [`ConfigFile`] |
//! | `ANCHORS_PRIVATE_KEY` | Ed25519 seed, 64 hex chars |
//! | `ANCHORS_HOSTNAME` | URL peers reach this node under |
//! | `ANCHORS_BOOTSTRAP_NODES` | comma-separated URLs |
//! | `ANCHORS_GENESIS_PATH` | genesis JSON |
//! | `CHAINDATA_PATH` | database directory, must be absolute |

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared_crypto::NodeIdentity;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Hex-encoded Ed25519 seed of the node key.
    pub private_key: Option<String>,
    pub genesis_path: PathBuf,
    pub network: NetworkConfig,
    pub storage: StorageConfig,
    pub timing: TimingConfig,
}

impl NodeConfig {
    /// Key pair from the configured seed.
    pub fn identity(&self) -> Result<NodeIdentity> {
        let Some(seed) = self.private_key.as_deref() else {
            bail!("ANCHORS_PRIVATE_KEY is not set");
        };
        NodeIdentity::from_seed_hex(seed).context("Invalid node private key")
    }
}

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// URL under which peers reach this node.
    pub my_hostname: String,
    pub bootstrap_nodes: Vec<String>,
    /// Per-peer timeout of block fetches.
    pub block_fetch_timeout: Duration,
    /// Per-peer timeout of finalization and rotation calls.
    pub proof_request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            my_hostname: "http://localhost:7332".to_string(),
            bootstrap_nodes: Vec::new(),
            block_fetch_timeout: Duration::from_secs(1),
            proof_request_timeout: Duration::from_secs(5),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub chaindata_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            chaindata_path: PathBuf::from("./chaindata"),
        }
    }
}

/// Background task periods.
#[derive(Debug, Clone)]
pub struct TimingConfig {
    pub block_generation_interval: Duration,
    pub collector_interval: Duration,
    pub rotation_tick: Duration,
    pub liveness_check_interval: Duration,
    /// How long a voting stat may stand still before the creator is flagged.
    pub liveness_timeout: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            block_generation_interval: Duration::from_secs(1),
            collector_interval: Duration::from_secs(5),
            rotation_tick: Duration::from_millis(200),
            liveness_check_interval: Duration::from_secs(1),
            liveness_timeout: Duration::from_secs(30),
        }
    }
}

/// Overrides accepted from `ANCHORS_CONFIG_PATH`. Durations in milliseconds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub private_key: Option<String>,
    pub genesis_path: Option<PathBuf>,
    pub my_hostname: Option<String>,
    pub bootstrap_nodes: Option<Vec<String>>,
    pub chaindata_path: Option<PathBuf>,
    pub block_fetch_timeout_ms: Option<u64>,
    pub proof_request_timeout_ms: Option<u64>,
    pub block_generation_interval_ms: Option<u64>,
    pub collector_interval_ms: Option<u64>,
    pub rotation_tick_ms: Option<u64>,
    pub liveness_check_interval_ms: Option<u64>,
    pub liveness_timeout_ms: Option<u64>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn apply(self, config: &mut NodeConfig) {
        if let Some(key) = self.private_key {
            config.private_key = Some(key);
        }
        if let Some(path) = self.genesis_path {
            config.genesis_path = path;
        }
        if let Some(hostname) = self.my_hostname {
            config.network.my_hostname = hostname;
        }
        if let Some(nodes) = self.bootstrap_nodes {
            config.network.bootstrap_nodes = nodes;
        }
        if let Some(path) = self.chaindata_path {
            config.storage.chaindata_path = path;
        }

        let millis = Duration::from_millis;
        let network = &mut config.network;
        let timing = &mut config.timing;
        if let Some(ms) = self.block_fetch_timeout_ms {
            network.block_fetch_timeout = millis(ms);
        }
        if let Some(ms) = self.proof_request_timeout_ms {
            network.proof_request_timeout = millis(ms);
        }
        if let Some(ms) = self.block_generation_interval_ms {
            timing.block_generation_interval = millis(ms);
        }
        if let Some(ms) = self.collector_interval_ms {
            timing.collector_interval = millis(ms);
        }
        if let Some(ms) = self.rotation_tick_ms {
            timing.rotation_tick = millis(ms);
        }
        if let Some(ms) = self.liveness_check_interval_ms {
            timing.liveness_check_interval = millis(ms);
        }
        if let Some(ms) = self.liveness_timeout_ms {
            timing.liveness_timeout = millis(ms);
        }
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig> {
    load_config_from(|name| std::env::var(name).ok())
}

/// Load configuration with `lookup` standing in for the environment.
pub fn load_config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<NodeConfig> {
    let mut config = NodeConfig::default();

    if let Some(path) = lookup("ANCHORS_CONFIG_PATH") {
        ConfigFile::load(Path::new(&path))?.apply(&mut config);
        info!(path = %path, "Loaded config file");
    }

    apply_env(&mut config, lookup);
    Ok(config)
}

fn apply_env(config: &mut NodeConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup("ANCHORS_PRIVATE_KEY") {
        let valid = key.len() == 64 && hex::decode(&key).is_ok();
        if valid {
            config.private_key = Some(key);
        } else {
            warn!("ANCHORS_PRIVATE_KEY must be 32 bytes (64 hex chars)");
        }
    }

    if let Some(hostname) = lookup("ANCHORS_HOSTNAME") {
        config.network.my_hostname = hostname;
    }

    if let Some(nodes) = lookup("ANCHORS_BOOTSTRAP_NODES") {
        config.network.bootstrap_nodes = nodes
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
    }

    if let Some(path) = lookup("ANCHORS_GENESIS_PATH") {
        config.genesis_path = PathBuf::from(path);
    }

    if let Some(path) = lookup("CHAINDATA_PATH") {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            config.storage.chaindata_path = path;
        } else {
            warn!(path = %path.display(), "CHAINDATA_PATH must be absolute");
        }
    }
}
