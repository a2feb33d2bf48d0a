//! Proof-of-work nonce search.

use crate::block::Block;

/// Leading zero hex characters required of a block hash. Must match across
/// peers for chains to validate.
pub const MINING_DIFFICULTY: usize = 3;

/// Whether the block's canonical hash carries the required leading zeros.
pub fn meets_difficulty(block: &Block, difficulty: usize) -> bool {
    block.hash_hex().bytes().take(difficulty).all(|b| b == b'0')
}

/// Searches nonces from zero upward until the block satisfies the
/// difficulty. The timestamp was fixed when the candidate was built, so the
/// search space is the nonce alone.
pub fn mine_block(mut block: Block, difficulty: usize) -> Block {
    block.nonce = 0;
    while !meets_difficulty(&block, difficulty) {
        block.nonce += 1;
    }
    block
}
