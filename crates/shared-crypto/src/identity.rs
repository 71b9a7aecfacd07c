//! Local node identity.

use crate::signatures::{sign_hex, Ed25519KeyPair};
use crate::CryptoError;

/// The node's key pair together with its hex public key (its validator id).
pub struct NodeIdentity {
    keypair: Ed25519KeyPair,
    public_key: String,
}

impl NodeIdentity {
    /// Build an identity from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let keypair = Ed25519KeyPair::from_seed(seed);
        let public_key = keypair.public_key().to_hex();
        Self {
            keypair,
            public_key,
        }
    }

    /// Build an identity from a hex-encoded 32-byte seed.
    pub fn from_seed_hex(encoded: &str) -> Result<Self, CryptoError> {
        let raw = hex::decode(encoded.trim())?;
        let seed: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self::from_seed(seed))
    }

    /// Hex public key.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Sign a UTF-8 message.
    pub fn sign(&self, message: &str) -> String {
        sign_hex(&self.keypair, message)
    }
}

impl std::fmt::Debug for NodeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeIdentity")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify_hex;

    #[test]
    fn test_seed_hex_matches_raw_seed() {
        let a = NodeIdentity::from_seed([3u8; 32]);
        let b = NodeIdentity::from_seed_hex(&hex::encode([3u8; 32])).unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_signatures_verify_against_public_key() {
        let identity = NodeIdentity::from_seed([9u8; 32]);
        let sig = identity.sign("hello");
        assert!(verify_hex("hello", identity.public_key(), &sig));
    }

    #[test]
    fn test_short_seed_rejected() {
        assert!(matches!(
            NodeIdentity::from_seed_hex("abcd"),
            Err(CryptoError::InvalidPrivateKey)
        ));
    }
}
