//! Domain layer for anchor rotation.

pub mod messages;
pub mod policy;
