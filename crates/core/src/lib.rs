//! Core ledger primitives for powchain.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - Hashing and the proof-of-work difficulty predicate
//! - Ed25519 keys, addresses and signatures
//! - Transactions (signed transfers and mining rewards)
//! - Blocks and the sequential nonce search

pub mod block;
pub mod crypto;
pub mod hash;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::Block;
pub use crypto::{Address, CryptoError, Keypair, PublicKey, Signature};
pub use hash::{hash, hash_concat, Hash, H256};
pub use transaction::{Reward, Transaction, TransactionError, Transfer};
