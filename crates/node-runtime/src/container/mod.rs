//! # Node Container
//!
//! Builds every service of the node around one `EpochState` and spawns the
//! background tasks.

pub mod config;
pub mod node;

pub use config::{load_config, load_config_from, ConfigFile, NodeConfig};
pub use node::{AnchorsNode, BackgroundTasks, Peers};
