//! Domain layer for the finalization protocol.

pub mod messages;
