//! Cryptographic primitives for ironchain
//!
//! Signatures travel as raw `R‖S` hex and public keys as uncompressed
//! `X‖Y` coordinate hex, so peers interoperate without a DER parser.

use crate::error::ChainError;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;

/// Uncompressed P-256 point as `X‖Y`, 64 hex characters per coordinate.
pub const PUBLIC_KEY_HEX_LEN: usize = 128;
/// `R‖S` signature, 64 hex characters per scalar.
pub const SIGNATURE_HEX_LEN: usize = 128;

/// An ECDSA P-256 signature over the canonical transaction form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(p256::ecdsa::Signature);

impl Signature {
    /// Parses the wire form: lowercase hex of `R‖S` with no separator.
    pub fn from_hex(s: &str) -> Result<Self, ChainError> {
        if s.len() != SIGNATURE_HEX_LEN {
            return Err(ChainError::CryptoError(format!(
                "Signature must be {} hex characters, got {}",
                SIGNATURE_HEX_LEN,
                s.len()
            )));
        }
        let bytes = hex::decode(s)
            .map_err(|e| ChainError::CryptoError(format!("Invalid signature hex: {}", e)))?;
        let signature = p256::ecdsa::Signature::from_slice(&bytes)
            .map_err(|e| ChainError::CryptoError(format!("Invalid signature scalars: {}", e)))?;
        Ok(Signature(signature))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    pub(crate) fn inner(&self) -> &p256::ecdsa::Signature {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parses a public key from `X‖Y` coordinate hex (no SEC1 tag byte).
pub fn public_key_from_hex(s: &str) -> Result<VerifyingKey, ChainError> {
    if s.len() != PUBLIC_KEY_HEX_LEN {
        return Err(ChainError::CryptoError(format!(
            "Public key must be {} hex characters, got {}",
            PUBLIC_KEY_HEX_LEN,
            s.len()
        )));
    }
    let coordinates = hex::decode(s)
        .map_err(|e| ChainError::CryptoError(format!("Invalid public key hex: {}", e)))?;
    // Rebuild the SEC1 uncompressed encoding: 0x04 ‖ X ‖ Y.
    let mut sec1 = Vec::with_capacity(1 + coordinates.len());
    sec1.push(0x04);
    sec1.extend_from_slice(&coordinates);
    VerifyingKey::from_sec1_bytes(&sec1)
        .map_err(|e| ChainError::CryptoError(format!("Invalid public key point: {}", e)))
}

/// Renders a public key as `X‖Y` coordinate hex.
pub fn public_key_to_hex(public_key: &VerifyingKey) -> String {
    let point = public_key.to_encoded_point(false);
    // Skip the SEC1 tag byte; the rest is X‖Y at fixed width.
    hex::encode(&point.as_bytes()[1..])
}

/// Verifies an ECDSA signature over `message` (hashed with SHA-256).
pub fn verify_signature(
    public_key: &VerifyingKey,
    message: &[u8],
    signature: &Signature,
) -> Result<(), ChainError> {
    public_key
        .verify(message, signature.inner())
        .map_err(|_| ChainError::CryptoError("Signature verification failed".to_string()))
}

/// Derives the base58check wallet address from a public key:
/// base58( 0x00 ‖ RIPEMD160(SHA256(X‖Y)) ‖ checksum4 ).
pub fn derive_address(public_key: &VerifyingKey) -> String {
    let point = public_key.to_encoded_point(false);
    let digest = Sha256::digest(&point.as_bytes()[1..]);
    let ripemd_hash = Ripemd160::digest(digest);

    let mut payload = Vec::with_capacity(25);
    payload.push(0x00);
    payload.extend_from_slice(&ripemd_hash);

    let checksum = Sha256::digest(Sha256::digest(&payload));
    payload.extend_from_slice(&checksum[..4]);

    bs58::encode(payload).into_string()
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = *signing_key.verifying_key();
        KeyPair {
            signing_key,
            verifying_key,
        }
    }

    /// Restores a KeyPair from a hex-encoded secret scalar.
    pub fn from_secret_hex(s: &str) -> Result<Self, ChainError> {
        let bytes = hex::decode(s)
            .map_err(|e| ChainError::CryptoError(format!("Invalid secret key hex: {}", e)))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| ChainError::CryptoError(format!("Invalid secret key bytes: {}", e)))?;
        let verifying_key = *signing_key.verifying_key();
        Ok(KeyPair {
            signing_key,
            verifying_key,
        })
    }

    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    pub fn public_key_hex(&self) -> String {
        public_key_to_hex(&self.verifying_key)
    }

    /// The base58check blockchain address bound to this key pair.
    pub fn address(&self) -> String {
        derive_address(&self.verifying_key)
    }

    /// Signs a message (hashed with SHA-256) and returns the raw signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message))
    }
}
