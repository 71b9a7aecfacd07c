//! # Shared Crypto - Hashing and Signature Primitives
//!
//! The consensus core treats these as black-box services:
//!
//! | Contract | Implementation |
//! |----------|----------------|
//! | `hash(bytes) -> digest` | BLAKE3, lowercase hex output |
//! | `sign(privateKey, message) -> signature` | Ed25519, hex output |
//! | `verify(message, publicKey, signature) -> bool` | Ed25519 over hex inputs |
//!
//! Validators are identified by their hex-encoded Ed25519 public key, so a
//! signer id and a verification key are the same string.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod identity;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::blake3_hex;
pub use identity::NodeIdentity;
pub use signatures::{sign_hex, verify_hex, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
