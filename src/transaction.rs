//! Transaction types and the signed wire envelope.

use crate::crypto::{self, Signature};
use crate::error::ChainError;
use p256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};

/// Reserved sender string marking mining rewards. Never signed, never
/// accepted from the network.
pub const COINBASE_SENDER: &str = "THE BLOCKCHAIN";

/// A value transfer in its canonical, signed-over form. Field order is the
/// wire order; signatures cover exactly this serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender_blockchain_address: String,
    pub recipient_blockchain_address: String,
    pub value: f32,
}

impl Transaction {
    pub fn new(sender: &str, recipient: &str, value: f32) -> Self {
        Transaction {
            sender_blockchain_address: sender.to_string(),
            recipient_blockchain_address: recipient.to_string(),
            value,
        }
    }

    /// The byte-exact serialization signatures are computed over.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("canonical JSON encoding cannot fail")
    }

    pub fn is_coinbase(&self) -> bool {
        self.sender_blockchain_address == COINBASE_SENDER
    }
}

/// The wire envelope a wallet (or a gossiping peer) submits: the canonical
/// transaction fields plus the sender's public key and signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender_blockchain_address: String,
    pub recipient_blockchain_address: String,
    pub sender_public_key: String,
    pub value: f32,
    pub signature: String,
}

impl TransactionRequest {
    /// The canonical transaction this envelope carries.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(
            &self.sender_blockchain_address,
            &self.recipient_blockchain_address,
            self.value,
        )
    }

    pub fn sender_public_key(&self) -> Result<VerifyingKey, ChainError> {
        crypto::public_key_from_hex(&self.sender_public_key)
    }

    pub fn parse_signature(&self) -> Result<Signature, ChainError> {
        Signature::from_hex(&self.signature)
    }
}
