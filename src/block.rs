//! Block structure and canonical hashing.

use crate::transaction::Transaction;
use chrono::Utc;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type Sha256Hash = [u8; 32];

/// Hash of the canonical all-zero block. Every genesis block points at it,
/// which is what lets independently started nodes recognize each other's
/// chains.
pub static ZERO_BLOCK_HASH: Lazy<Sha256Hash> = Lazy::new(|| Block::zero().hash());

/// A timestamped bundle of transactions linked to its predecessor by hash.
///
/// The declared field order is the canonical JSON key order; the block hash
/// is SHA-256 over exactly that serialization, with `previous_hash` rendered
/// as 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub timestamp: i64,
    pub nonce: u64,
    #[serde(with = "hex_hash")]
    pub previous_hash: Sha256Hash,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Creates a block stamped with the current wall clock. The timestamp is
    /// fixed here, before any nonce search runs over the block.
    pub fn new(nonce: u64, previous_hash: Sha256Hash, transactions: Vec<Transaction>) -> Self {
        Block {
            timestamp: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            nonce,
            previous_hash,
            transactions,
        }
    }

    /// The all-zero block whose hash seeds every genesis.
    pub fn zero() -> Self {
        Block {
            timestamp: 0,
            nonce: 0,
            previous_hash: [0u8; 32],
            transactions: Vec::new(),
        }
    }

    /// The byte-exact serialization the block hash is computed over.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("canonical JSON encoding cannot fail")
    }

    pub fn hash(&self) -> Sha256Hash {
        Sha256::digest(self.canonical_bytes()).into()
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash())
    }
}

/// Serde adapter rendering a 32-byte hash as 64 lowercase hex characters.
mod hex_hash {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("previous_hash must be 32 bytes"))
    }
}
