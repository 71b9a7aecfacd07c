//! Domain layer for proof mempools.

pub mod mempool;
pub mod policy;
pub mod proof;
