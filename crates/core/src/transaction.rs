//! Transaction types and signing.
//!
//! A ledger transaction is either a [`Transfer`] between two wallets, which
//! must carry the sender's signature, or a [`Reward`] minted by the miner of
//! a block, which has no sender and is trusted as-is.

use crate::crypto::{Address, Keypair, Signature};
use crate::hash::{hash_concat, Hash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during transaction operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("cannot sign a transaction whose sender does not match the signing key")]
    Unauthorized,
    #[error("transaction is already signed")]
    AlreadySigned,
    #[error("missing signature")]
    MissingSignature,
}

pub type Result<T> = std::result::Result<T, TransactionError>;

/// A value transfer from one wallet to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Sender's address (its public key).
    pub from: Address,
    /// Recipient's address.
    pub to: Address,
    /// Value to transfer.
    pub amount: u64,
    /// Sender's signature over [`Transaction::digest`].
    pub signature: Option<Signature>,
}

/// A mining reward paid to whoever sealed a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Beneficiary of the reward.
    pub to: Address,
    /// Reward amount.
    pub amount: u64,
}

/// A transaction on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Transfer(Transfer),
    Reward(Reward),
}

impl Transaction {
    /// Create a new unsigned transfer.
    pub fn transfer(from: Address, to: Address, amount: u64) -> Self {
        Self::Transfer(Transfer {
            from,
            to,
            amount,
            signature: None,
        })
    }

    /// Create a mining reward.
    pub fn reward(to: Address, amount: u64) -> Self {
        Self::Reward(Reward { to, amount })
    }

    /// The sender, or `None` for a reward.
    pub fn from(&self) -> Option<&Address> {
        match self {
            Self::Transfer(tx) => Some(&tx.from),
            Self::Reward(_) => None,
        }
    }

    /// The recipient.
    pub fn to(&self) -> &Address {
        match self {
            Self::Transfer(tx) => &tx.to,
            Self::Reward(tx) => &tx.to,
        }
    }

    /// The transferred amount.
    pub fn amount(&self) -> u64 {
        match self {
            Self::Transfer(tx) => tx.amount,
            Self::Reward(tx) => tx.amount,
        }
    }

    /// The signature, if any.
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Self::Transfer(tx) => tx.signature.as_ref(),
            Self::Reward(_) => None,
        }
    }

    /// Check if this is a mining reward.
    pub fn is_reward(&self) -> bool {
        matches!(self, Self::Reward(_))
    }

    /// Digest of the (from, to, amount) triple. This is what gets signed.
    ///
    /// A reward hashes an empty sender.
    pub fn digest(&self) -> Hash {
        let from: &[u8] = match self.from() {
            Some(from) => from.as_bytes(),
            None => &[],
        };
        hash_concat(&[from, self.to().as_bytes(), &self.amount().to_le_bytes()])
    }

    /// Sign the transaction with the sender's keypair.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<()> {
        let digest = self.digest();
        let Self::Transfer(tx) = self else {
            return Err(TransactionError::Unauthorized);
        };
        if keypair.address() != tx.from {
            return Err(TransactionError::Unauthorized);
        }
        if tx.signature.is_some() {
            return Err(TransactionError::AlreadySigned);
        }

        tx.signature = Some(keypair.sign_hash(&digest));
        Ok(())
    }

    /// Create a signed transaction.
    pub fn signed(mut self, keypair: &Keypair) -> Result<Self> {
        self.sign(keypair)?;
        Ok(self)
    }

    /// Check the transaction's authenticity.
    ///
    /// Rewards are always valid. A transfer without a signature is an error;
    /// a signature that does not verify against the sender's key is `Ok(false)`.
    pub fn is_valid(&self) -> Result<bool> {
        let tx = match self {
            Self::Reward(_) => return Ok(true),
            Self::Transfer(tx) => tx,
        };
        let signature = tx.signature.as_ref().ok_or(TransactionError::MissingSignature)?;

        let Ok(public_key) = tx.from.to_public_key() else {
            tracing::debug!(from = %tx.from, "sender is not a valid public key");
            return Ok(false);
        };
        Ok(public_key.verify(self.digest().as_bytes(), signature).is_ok())
    }
}
