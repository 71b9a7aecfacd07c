//! Cross-subsystem tests.

pub mod lifecycle;
pub mod properties;
pub mod scenarios;
