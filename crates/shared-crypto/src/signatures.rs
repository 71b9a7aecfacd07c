//! # Ed25519 Signatures
//!
//! Twisted Edwards curve signatures with deterministic nonces.
//!
//! Keys and signatures travel as hex strings between nodes; `sign_hex` and
//! `verify_hex` are the boundary helpers the protocol crates call.

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Parse a hex-encoded public key, rejecting bytes that are not a curve
    /// point.
    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        let raw = hex::decode(encoded)?;
        let bytes: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Lowercase hex encoding (the validator id form).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify a signature.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;

        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Parse a hex-encoded signature.
    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        let raw = hex::decode(encoded)?;
        let bytes: [u8; 64] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureFormat)?;
        Ok(Self(bytes))
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Ed25519 keypair. The secret is wiped when the inner `SigningKey` drops.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// Get public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        let verifying_key = self.signing_key.verifying_key();
        Ed25519PublicKey(verifying_key.to_bytes())
    }

    /// Sign a message (deterministic - no RNG needed).
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let sig = self.signing_key.sign(message);
        Ed25519Signature(sig.to_bytes())
    }
}

/// Sign a UTF-8 message, returning the signature as hex.
pub fn sign_hex(keypair: &Ed25519KeyPair, message: &str) -> String {
    keypair.sign(message.as_bytes()).to_hex()
}

/// Verify a hex signature over a UTF-8 message against a hex public key.
///
/// Malformed keys or signatures verify as `false`.
pub fn verify_hex(message: &str, public_key_hex: &str, signature_hex: &str) -> bool {
    let (Ok(public_key), Ok(signature)) = (
        Ed25519PublicKey::from_hex(public_key_hex),
        Ed25519Signature::from_hex(signature_hex),
    ) else {
        return false;
    };
    public_key.verify(message.as_bytes(), &signature).is_ok()
}
