//! Ports for the finalization protocol.

pub mod outbound;
