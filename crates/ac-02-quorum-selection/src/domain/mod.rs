//! Domain layer for quorum selection.

pub mod attestation;
pub mod selection;
pub mod shuffle;
