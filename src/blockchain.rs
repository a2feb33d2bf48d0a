//! Chain and pending-pool state machine.
//!
//! `Blockchain` is purely in-memory and single-threaded; the node wraps it
//! in a mutex and holds the guard across every compound operation, so a mint
//! is atomic with respect to concurrent submissions and chain reads.

use crate::block::{Block, ZERO_BLOCK_HASH};
use crate::crypto::{self, Signature};
use crate::error::ChainError;
use crate::miner::{self, MINING_DIFFICULTY};
use crate::transaction::{Transaction, COINBASE_SENDER};
use p256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};

/// Reward paid to the node's own address with every sealed block.
pub const MINING_REWARD: f32 = 1.0;

/// Wire form of the chain, as served by `GET /chain` and consumed during
/// consensus rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEnvelope {
    pub chain: Vec<Block>,
}

pub struct Blockchain {
    chain: Vec<Block>,
    transaction_pool: Vec<Transaction>,
    blockchain_address: String,
}

impl Blockchain {
    /// Creates a chain holding only the genesis block: nonce 0, pointing at
    /// the canonical all-zero block. Genesis never satisfies proof-of-work.
    pub fn new(blockchain_address: String) -> Self {
        let genesis = Block::new(0, *ZERO_BLOCK_HASH, Vec::new());
        Blockchain {
            chain: vec![genesis],
            transaction_pool: Vec::new(),
            blockchain_address,
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn transaction_pool(&self) -> &[Transaction] {
        &self.transaction_pool
    }

    pub fn blockchain_address(&self) -> &str {
        &self.blockchain_address
    }

    pub fn last_block(&self) -> &Block {
        self.chain.last().expect("chain is never empty")
    }

    /// Validates and appends a pending transaction.
    ///
    /// Coinbase transactions skip signature and balance checks; they are
    /// only ever synthesized by the local miner (the HTTP surface rejects
    /// coinbase-shaped submissions before reaching here).
    pub fn add_transaction(
        &mut self,
        transaction: Transaction,
        sender_public_key: Option<&VerifyingKey>,
        signature: Option<&Signature>,
    ) -> Result<(), ChainError> {
        if transaction.is_coinbase() {
            self.transaction_pool.push(transaction);
            return Ok(());
        }

        let (public_key, signature) = match (sender_public_key, signature) {
            (Some(public_key), Some(signature)) => (public_key, signature),
            _ => {
                return Err(ChainError::InvalidTransaction(
                    "transaction is not signed".to_string(),
                ))
            }
        };

        crypto::verify_signature(public_key, &transaction.canonical_bytes(), signature)
            .map_err(|_| ChainError::InvalidSignature)?;

        let balance = self.calculate_total_amount(&transaction.sender_blockchain_address);
        if balance < transaction.value {
            return Err(ChainError::InsufficientBalance {
                balance,
                value: transaction.value,
            });
        }

        self.transaction_pool.push(transaction);
        Ok(())
    }

    pub fn clear_transaction_pool(&mut self) {
        self.transaction_pool.clear();
    }

    /// Balance by full-chain scan: credits to `address` minus debits from it.
    pub fn calculate_total_amount(&self, address: &str) -> f32 {
        let mut total = 0.0f32;
        for block in &self.chain {
            for transaction in &block.transactions {
                if address == transaction.recipient_blockchain_address {
                    total += transaction.value;
                }
                if address == transaction.sender_blockchain_address {
                    total -= transaction.value;
                }
            }
        }
        total
    }

    /// Builds a candidate from the current pool and the last block's hash,
    /// then searches the nonce. The candidate's timestamp is fixed at
    /// construction, so the sealed block's stored hash itself satisfies the
    /// difficulty.
    pub fn proof_of_work(&self) -> Block {
        let transactions = self.transaction_pool.clone();
        let previous_hash = self.last_block().hash();
        let candidate = Block::new(0, previous_hash, transactions);
        miner::mine_block(candidate, MINING_DIFFICULTY)
    }

    /// One mint: append the reward transaction, run proof-of-work over the
    /// pool, seal the result onto the chain. The pool is emptied as a side
    /// effect.
    pub fn mining(&mut self) -> Block {
        let reward_address = self.blockchain_address.clone();
        self.transaction_pool
            .push(Transaction::new(COINBASE_SENDER, &reward_address, MINING_REWARD));

        let sealed = self.proof_of_work();
        self.chain.push(sealed.clone());
        self.transaction_pool.clear();
        sealed
    }

    /// Full validity check used on candidate chains during consensus:
    /// genesis shape, hash linkage, and proof-of-work on every block after
    /// genesis.
    pub fn valid_chain(chain: &[Block]) -> bool {
        let Some(genesis) = chain.first() else {
            return false;
        };
        if genesis.nonce != 0 || genesis.previous_hash != *ZERO_BLOCK_HASH {
            return false;
        }
        for window in chain.windows(2) {
            let (previous, block) = (&window[0], &window[1]);
            if block.previous_hash != previous.hash() {
                return false;
            }
            if !miner::meets_difficulty(block, MINING_DIFFICULTY) {
                return false;
            }
        }
        true
    }

    /// Installs `candidate` iff it is strictly longer than the local chain
    /// and fully valid. Equal length never displaces the local chain. The
    /// pool is left untouched; only mining drains it.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() > self.chain.len() && Self::valid_chain(&candidate) {
            self.chain = candidate;
            return true;
        }
        false
    }
}
