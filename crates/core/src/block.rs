//! Block structure and the sequential proof-of-work search.

use crate::hash::{hash, Hash};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Timestamp of the genesis block (2019-01-01T00:00:00Z, in milliseconds).
pub const GENESIS_TIMESTAMP: u64 = 1_546_300_800_000;

/// A sealed batch of transactions linked to its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    /// Transactions in this block. Order is part of the hash.
    pub transactions: Vec<Transaction>,
    /// Hash of the previous block ([`Hash::ZERO`] for genesis).
    pub previous_hash: Hash,
    /// Proof-of-work search variable.
    pub nonce: u64,
    /// Stored hash, sealed at construction and by mining.
    pub hash: Hash,
}

/// The fields covered by the block hash, in hashing order.
#[derive(Serialize)]
struct HashedFields<'a> {
    previous_hash: &'a Hash,
    timestamp: u64,
    transactions: &'a [Transaction],
    nonce: u64,
}

impl Block {
    /// Create a new unmined block. The hash is computed immediately.
    pub fn new(timestamp: u64, transactions: Vec<Transaction>, previous_hash: Hash) -> Self {
        let mut block = Self {
            timestamp,
            transactions,
            previous_hash,
            nonce: 0,
            hash: Hash::ZERO,
        };
        block.rehash();
        block
    }

    /// Create the genesis block. Its content is fixed and it is never mined.
    pub fn genesis() -> Self {
        Self::new(GENESIS_TIMESTAMP, Vec::new(), Hash::ZERO)
    }

    /// Get the current Unix timestamp in milliseconds.
    pub fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_millis() as u64
    }

    /// Recompute the digest over the block's current fields.
    pub fn compute_hash(&self) -> Hash {
        self.hash_with_nonce(self.nonce)
    }

    /// Compute the digest this block would have with the given nonce.
    pub fn hash_with_nonce(&self, nonce: u64) -> Hash {
        let fields = HashedFields {
            previous_hash: &self.previous_hash,
            timestamp: self.timestamp,
            transactions: &self.transactions,
            nonce,
        };
        let encoded = bincode::serialize(&fields).expect("serialization should not fail");
        hash(&encoded)
    }

    /// Store a freshly computed hash after a legitimate edit.
    pub fn rehash(&mut self) {
        self.hash = self.compute_hash();
    }

    /// Check the stored hash against a recomputation.
    pub fn is_hash_consistent(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Search for a nonce whose hash starts with `difficulty` zero hex digits.
    ///
    /// The search resumes from the current nonce. There is no iteration
    /// bound: a difficulty above 64 never terminates.
    pub fn mine(&mut self, difficulty: usize) {
        // A stale stored hash must not end the search early.
        self.rehash();
        while !self.hash.meets_difficulty(difficulty) {
            self.nonce += 1;
            self.rehash();
        }
        tracing::debug!(nonce = self.nonce, hash = %self.hash, "block mined");
    }

    /// Check that every transaction authenticates. Stops at the first failure.
    ///
    /// A transaction whose check errors (e.g. unsigned) counts as invalid.
    pub fn has_valid_transactions(&self) -> bool {
        self.transactions
            .iter()
            .all(|tx| matches!(tx.is_valid(), Ok(true)))
    }

    /// Check if this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        *self == Self::genesis()
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Address, Keypair};

    fn sample_transactions() -> Vec<Transaction> {
        let keypair = Keypair::generate();
        let to = Address::from_bytes([2u8; 32]);
        vec![
            Transaction::transfer(keypair.address(), to, 100)
                .signed(&keypair)
                .unwrap(),
            Transaction::reward(to, 100),
        ]
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis();

        assert!(genesis.is_genesis());
        assert_eq!(genesis.previous_hash, Hash::ZERO);
        assert_eq!(genesis.timestamp, GENESIS_TIMESTAMP);
        assert_eq!(genesis.nonce, 0);
        assert!(genesis.transactions.is_empty());
        assert!(genesis.is_hash_consistent());
    }

    #[test]
    fn test_genesis_is_fixed() {
        assert_eq!(Block::genesis().hash, Block::genesis().hash);
    }

    #[test]
    fn test_new_block_hash_is_sealed() {
        let block = Block::new(1, sample_transactions(), Hash::ZERO);
        assert_eq!(block.hash, block.compute_hash());
        assert!(!block.is_genesis());
    }

    #[test]
    fn test_hash_covers_every_field() {
        let block = Block::new(1, sample_transactions(), Hash::ZERO);

        let mut changed = block.clone();
        changed.timestamp += 1;
        assert_ne!(changed.compute_hash(), block.hash);

        let mut changed = block.clone();
        changed.previous_hash = Hash::from_bytes([1u8; 32]);
        assert_ne!(changed.compute_hash(), block.hash);

        let mut changed = block.clone();
        changed.nonce += 1;
        assert_ne!(changed.compute_hash(), block.hash);

        let mut changed = block.clone();
        changed.transactions.reverse();
        assert_ne!(changed.compute_hash(), block.hash);
    }

    #[test]
    fn test_hash_with_nonce_matches_compute_hash() {
        let mut block = Block::new(1, sample_transactions(), Hash::ZERO);
        let expected = block.hash_with_nonce(7);
        block.nonce = 7;
        assert_eq!(block.compute_hash(), expected);
    }

    #[test]
    fn test_tampering_breaks_consistency() {
        let mut block = Block::new(1, sample_transactions(), Hash::ZERO);
        block.transactions.pop();
        assert!(!block.is_hash_consistent());

        block.rehash();
        assert!(block.is_hash_consistent());
    }

    #[test]
    fn test_mine_meets_difficulty() {
        let mut block = Block::new(1, sample_transactions(), Hash::ZERO);
        block.mine(2);

        assert!(block.hash.to_hex().starts_with("00"));
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn test_mine_zero_difficulty_keeps_nonce() {
        let mut block = Block::new(1, sample_transactions(), Hash::ZERO);
        let before = block.hash;
        block.mine(0);

        assert_eq!(block.nonce, 0);
        assert_eq!(block.hash, before);
    }

    #[test]
    fn test_mine_after_edit_reseals() {
        let mut block = Block::new(1, sample_transactions(), Hash::ZERO);
        block.mine(1);

        block.timestamp += 1;
        block.mine(1);

        assert!(block.is_hash_consistent());
        assert!(block.hash.meets_difficulty(1));
    }

    #[test]
    fn test_valid_transactions() {
        let block = Block::new(1, sample_transactions(), Hash::ZERO);
        assert!(block.has_valid_transactions());
        assert_eq!(block.tx_count(), 2);
    }

    #[test]
    fn test_unsigned_transaction_is_invalid() {
        let from = Keypair::generate().address();
        let to = Address::from_bytes([2u8; 32]);
        let block = Block::new(1, vec![Transaction::transfer(from, to, 1)], Hash::ZERO);

        assert!(!block.has_valid_transactions());
    }

    #[test]
    fn test_tampered_transaction_is_invalid() {
        let mut block = Block::new(1, sample_transactions(), Hash::ZERO);
        if let Transaction::Transfer(tx) = &mut block.transactions[0] {
            tx.amount = 1;
        }
        assert!(!block.has_valid_transactions());
    }
}
