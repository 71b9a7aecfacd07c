//! # Genesis Loading
//!
//! The genesis file is the same on every node: network id, start of epoch 0,
//! network parameters and the validator registry with URLs.
//!
//! ```json
//! {
//!   "networkId": "anchors-mainnet",
//!   "firstEpochStartTimestamp": 1700000000000,
//!   "networkParameters": { "quorumSize": 21, "epochDuration": 86400000 },
//!   "validators": [{ "pubkey": "<hex>", "url": "http://..." }],
//!   "coreMajorVersion": 1
//! }
//! ```

use ac_03_epoch_state::Genesis;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Read and sanity-check a genesis file.
pub fn load_genesis(path: &Path) -> Result<Genesis> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read genesis file {}", path.display()))?;
    let genesis: Genesis = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse genesis file {}", path.display()))?;
    validate(&genesis)?;
    Ok(genesis)
}

fn validate(genesis: &Genesis) -> Result<()> {
    if genesis.network_id.is_empty() {
        bail!("Genesis network id is empty");
    }
    if genesis.validators.is_empty() {
        bail!("Genesis validator list is empty");
    }
    if genesis.network_parameters.quorum_size == 0 {
        bail!("Genesis quorum size must be positive");
    }
    if genesis.network_parameters.epoch_duration == 0 {
        bail!("Genesis epoch duration must be positive");
    }
    if let Some(v) = genesis.validators.iter().find(|v| v.pubkey.is_empty() || v.url.is_empty()) {
        bail!("Genesis validator entry is incomplete: {:?}", v);
    }
    Ok(())
}
