//! Proof of Work consensus for powchain.
//!
//! This crate provides:
//! - Nonce search for the leading-zero difficulty puzzle, sequential or
//!   spread across a thread pool
//! - Transaction admission rules
//! - Whole-chain validation (transaction authenticity, sealed hashes, links)
//!
//! # Example
//!
//! ```rust,no_run
//! use powchain_consensus::{ChainValidator, Miner, PowConfig};
//! use powchain_core::Block;
//!
//! let miner = Miner::new(PowConfig::new(3, 4)).unwrap();
//!
//! let genesis = Block::genesis();
//! let mut block = Block::new(Block::current_timestamp(), vec![], genesis.hash);
//! miner.mine(&mut block);
//!
//! assert!(miner.verify_pow(&block));
//! assert!(ChainValidator::is_valid(&[genesis, block]));
//! ```

pub mod pow;
pub mod validator;

// Re-export commonly used types
pub use pow::{ConsensusError, Miner, MiningOutcome, PowConfig, MAX_DIFFICULTY};
pub use validator::{ChainValidator, TransactionValidator, ValidationError};
