//! # BLAKE3 Hashing
//!
//! Every digest that crosses a node boundary (block hashes, epoch hashes,
//! quorum seeds) is a BLAKE3 hash rendered as lowercase hex.

/// Hash a UTF-8 string and return the digest as lowercase hex.
pub fn blake3_hex(data: &str) -> String {
    hex::encode(blake3::hash(data.as_bytes()).as_bytes())
}
