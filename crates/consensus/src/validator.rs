//! Transaction admission and chain validation rules.

use powchain_core::{Block, Transaction, TransactionError};
use thiserror::Error;

/// Errors that can occur during validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("transaction must name both parties")]
    MissingParty,

    #[error("cannot queue an invalid transaction")]
    InvalidSignature,

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("chain has no genesis block")]
    EmptyChain,

    #[error("block {index} contains an invalid transaction")]
    InvalidTransactions { index: usize },

    #[error("block {index} hash does not match its contents")]
    HashMismatch { index: usize },

    #[error("block {index} does not link to its predecessor")]
    BrokenLink { index: usize },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Transaction validator.
pub struct TransactionValidator;

impl TransactionValidator {
    /// Admission check for the pending pool.
    ///
    /// Both parties must be named, so rewards are never admitted from outside.
    /// An unsigned transfer surfaces `TransactionError::MissingSignature`.
    pub fn validate_for_admission(tx: &Transaction) -> Result<()> {
        let Some(from) = tx.from() else {
            return Err(ValidationError::MissingParty);
        };
        if from.is_zero() || tx.to().is_zero() {
            return Err(ValidationError::MissingParty);
        }

        if !tx.is_valid()? {
            return Err(ValidationError::InvalidSignature);
        }

        Ok(())
    }
}

/// Chain validator.
pub struct ChainValidator;

impl ChainValidator {
    /// Validate a single block against its predecessor.
    ///
    /// Checks run in order: transactions, sealed hash, link to the parent's
    /// recomputed hash.
    pub fn validate_block(block: &Block, parent: &Block, index: usize) -> Result<()> {
        if !block.has_valid_transactions() {
            return Err(ValidationError::InvalidTransactions { index });
        }

        if !block.is_hash_consistent() {
            return Err(ValidationError::HashMismatch { index });
        }

        // Recomputed, so a re-hashed parent also breaks the link.
        if block.previous_hash != parent.compute_hash() {
            return Err(ValidationError::BrokenLink { index });
        }

        Ok(())
    }

    /// Validate a whole chain, reporting the first failing block.
    ///
    /// The genesis block at index 0 is taken as given.
    pub fn validate(blocks: &[Block]) -> Result<()> {
        if blocks.is_empty() {
            return Err(ValidationError::EmptyChain);
        }

        for (index, pair) in blocks.windows(2).enumerate() {
            Self::validate_block(&pair[1], &pair[0], index + 1)?;
        }

        Ok(())
    }

    /// Boolean form of [`ChainValidator::validate`].
    pub fn is_valid(blocks: &[Block]) -> bool {
        Self::validate(blocks).is_ok()
    }
}
