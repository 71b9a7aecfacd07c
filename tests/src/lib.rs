//! # Anchors Test Suite
//!
//! Unified test crate for behavior that spans several subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs          # In-process cluster: one EpochState per node,
//! │                       # peers routed by URL instead of HTTP
//! │
//! └── integration/
//!     ├── scenarios.rs    # Certification, rotation proofs, first block
//!     ├── lifecycle.rs    # Proposer → AFP → epoch rotation
//!     └── properties.rs   # Signatures, indices, majority, mempools
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ac-tests
//!
//! # By category
//! cargo test -p ac-tests integration::scenarios::
//! cargo test -p ac-tests integration::properties::
//! ```

pub mod harness;
pub mod integration;
