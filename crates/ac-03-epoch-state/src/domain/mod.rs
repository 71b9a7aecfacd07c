//! Domain layer for the epoch state.

pub mod cache;
pub mod genesis;
pub mod locks;
pub mod routes;
