//! Ports for the block model.

pub mod outbound;
