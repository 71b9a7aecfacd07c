//! Domain layer for epoch rotation.

pub mod delayed;
pub mod next_epoch;
