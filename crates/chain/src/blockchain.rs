//! Main ledger orchestration.
//!
//! This module brings together the pending pool, the miner and chain
//! validation. The ledger is single-writer: `mine_pending_transactions` is the
//! only way a block gets appended.

use crate::mempool::Mempool;
use powchain_consensus::{
    ChainValidator, ConsensusError, Miner, MiningOutcome, PowConfig, TransactionValidator,
    ValidationError,
};
use powchain_core::{Address, Block, Hash, Transaction};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("consensus error: {0}")]
    Consensus(#[from] ConsensusError),
}

pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Ledger configuration.
#[derive(Debug, Clone)]
pub struct BlockchainConfig {
    /// Required leading zero hex digits of a mined block hash.
    pub difficulty: usize,
    /// Amount paid to whoever seals the next block.
    pub mining_reward: u64,
    /// Worker threads for the nonce search.
    pub mining_threads: usize,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            difficulty: 2,
            mining_reward: 100,
            mining_threads: 1,
        }
    }
}

/// Main ledger struct.
pub struct Blockchain {
    /// Blocks in order, genesis first. Never empty.
    chain: Vec<Block>,
    /// Transactions waiting for the next block.
    mempool: Mempool,
    /// Proof-of-work engine.
    miner: Miner,
    /// Configuration.
    config: BlockchainConfig,
}

impl Blockchain {
    /// Create a ledger with the default configuration (difficulty 2, reward 100).
    pub fn new() -> Self {
        Self::with_config(BlockchainConfig::default())
            .expect("default configuration should be valid")
    }

    /// Create a ledger with the given configuration.
    pub fn with_config(config: BlockchainConfig) -> Result<Self> {
        let miner = Miner::new(PowConfig::new(config.difficulty, config.mining_threads))?;

        Ok(Self {
            chain: vec![Self::create_genesis_block()],
            mempool: Mempool::new(),
            miner,
            config,
        })
    }

    /// The fixed, unmined first block.
    pub fn create_genesis_block() -> Block {
        Block::genesis()
    }

    /// Get the latest block.
    pub fn latest_block(&self) -> &Block {
        self.chain
            .last()
            .expect("chain always holds the genesis block")
    }

    /// Get the current chain height (0 when only genesis exists).
    pub fn height(&self) -> u64 {
        (self.chain.len() - 1) as u64
    }

    /// All blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Raw mutable access to sealed blocks.
    ///
    /// Any edit that is not re-mined shows up in [`Blockchain::validate_chain`].
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.chain
    }

    /// Transactions waiting for the next block.
    pub fn pending_transactions(&self) -> &[Transaction] {
        self.mempool.transactions()
    }

    /// Required leading zero hex digits.
    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    /// Reward paid per mined block.
    pub fn mining_reward(&self) -> u64 {
        self.config.mining_reward
    }

    /// Submit a transaction to the pending pool.
    ///
    /// Rejects transactions missing either party, unsigned transfers and
    /// transfers whose signature does not verify. The pool has no size limit.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<()> {
        if let Err(err) = TransactionValidator::validate_for_admission(&tx) {
            tracing::warn!(error = %err, "transaction rejected");
            return Err(err.into());
        }

        tracing::debug!(to = %tx.to(), amount = tx.amount(), "transaction queued");
        self.mempool.add(tx);
        Ok(())
    }

    /// Seal every pending transaction plus a reward into a new mined block.
    ///
    /// The reward goes last. On return the pending pool is empty and the new
    /// block is the chain tip.
    pub fn mine_pending_transactions(&mut self, reward_address: &Address) -> Result<&Block> {
        if reward_address.is_zero() {
            return Err(ValidationError::MissingParty.into());
        }

        let mut transactions = self.mempool.take_all();
        transactions.push(Transaction::reward(*reward_address, self.config.mining_reward));

        let previous_hash = self.latest_block().hash;
        let mut block = Block::new(Block::current_timestamp(), transactions, previous_hash);
        let MiningOutcome { nonce, attempts, .. } = self.miner.mine(&mut block);

        tracing::info!(
            height = self.chain.len(),
            hash = %block.hash,
            nonce,
            attempts,
            transactions = block.tx_count(),
            "block mined"
        );

        self.chain.push(block);
        Ok(self.latest_block())
    }

    /// Net balance of an address over the whole chain.
    ///
    /// Outgoing amounts count negative, incoming positive. Pending
    /// transactions are not included.
    pub fn balance_of(&self, address: &Address) -> i128 {
        let mut balance: i128 = 0;

        for tx in self.chain.iter().flat_map(|block| &block.transactions) {
            if tx.from() == Some(address) {
                balance -= i128::from(tx.amount());
            }
            if tx.to() == address {
                balance += i128::from(tx.amount());
            }
        }

        balance
    }

    /// Net balance of every address that appears on the chain.
    pub fn balances(&self) -> HashMap<Address, i128> {
        let mut balances: HashMap<Address, i128> = HashMap::new();

        for tx in self.chain.iter().flat_map(|block| &block.transactions) {
            let amount = i128::from(tx.amount());
            if let Some(from) = tx.from() {
                *balances.entry(*from).or_default() -= amount;
            }
            *balances.entry(*tx.to()).or_default() += amount;
        }

        balances
    }

    /// Sum of all mining rewards on the chain.
    pub fn total_issued(&self) -> u128 {
        self.chain
            .iter()
            .flat_map(|block| &block.transactions)
            .filter(|tx| tx.is_reward())
            .map(|tx| u128::from(tx.amount()))
            .sum()
    }

    /// Validate the chain, reporting which block failed and why.
    pub fn validate_chain(&self) -> std::result::Result<(), ValidationError> {
        let result = ChainValidator::validate(&self.chain);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "chain validation failed");
        }
        result
    }

    /// Check chain validity. Never fails; use `validate_chain` for the reason.
    pub fn is_chain_valid(&self) -> bool {
        self.validate_chain().is_ok()
    }

    /// Get ledger statistics.
    pub fn stats(&self) -> BlockchainStats {
        let latest = self.latest_block();

        BlockchainStats {
            height: self.height(),
            latest_block_hash: latest.hash,
            latest_timestamp: latest.timestamp,
            pending_transactions: self.mempool.len(),
            difficulty: self.config.difficulty,
            mining_reward: self.config.mining_reward,
            total_issued: self.total_issued(),
        }
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

/// Ledger statistics.
#[derive(Debug, Clone)]
pub struct BlockchainStats {
    /// Current chain height.
    pub height: u64,
    /// Hash of the latest block.
    pub latest_block_hash: Hash,
    /// Timestamp of the latest block.
    pub latest_timestamp: u64,
    /// Number of pending transactions.
    pub pending_transactions: usize,
    /// Required leading zero hex digits.
    pub difficulty: usize,
    /// Reward per mined block.
    pub mining_reward: u64,
    /// Sum of all rewards minted so far.
    pub total_issued: u128,
}
