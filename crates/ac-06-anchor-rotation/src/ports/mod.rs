//! Ports for anchor rotation.

pub mod outbound;
