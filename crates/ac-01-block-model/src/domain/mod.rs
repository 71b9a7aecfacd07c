//! Domain layer for the block model.

pub mod block;
pub mod extra_data;
pub mod metadata;
