//! Proof of Work (PoW) consensus implementation.
//!
//! A block is sealed by finding a nonce whose block hash starts with
//! `difficulty` zero hex digits. The search can run on the calling thread or
//! be split across a rayon thread pool; both return the same nonce, the
//! smallest one at or after the block's starting nonce.

use powchain_core::hash::HASH_HEX_LEN;
use powchain_core::{Block, Hash};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

/// Highest difficulty that a 256-bit hash can satisfy.
pub const MAX_DIFFICULTY: usize = HASH_HEX_LEN;

/// Errors that can occur during consensus operations.
#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("difficulty {difficulty} is unreachable (maximum {max})")]
    DifficultyTooHigh { difficulty: usize, max: usize },

    #[error("mining needs at least one thread")]
    NoThreads,

    #[error("mining batch size must be non-zero")]
    ZeroBatchSize,

    #[error("failed to build mining thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Proof of Work configuration.
#[derive(Debug, Clone)]
pub struct PowConfig {
    /// Required number of leading zero hex digits.
    pub difficulty: usize,
    /// Worker threads for the nonce search.
    pub threads: usize,
    /// Nonces handed to the pool per round when mining in parallel.
    pub batch_size: u64,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            difficulty: 2,
            threads: 1,
            batch_size: 4096,
        }
    }
}

impl PowConfig {
    /// Create a new PoW configuration.
    pub fn new(difficulty: usize, threads: usize) -> Self {
        Self {
            difficulty,
            threads,
            ..Self::default()
        }
    }

    /// Check that the configuration describes a search that can finish.
    pub fn validate(&self) -> Result<()> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(ConsensusError::DifficultyTooHigh {
                difficulty: self.difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        if self.threads == 0 {
            return Err(ConsensusError::NoThreads);
        }
        if self.batch_size == 0 {
            return Err(ConsensusError::ZeroBatchSize);
        }
        Ok(())
    }
}

/// Result of a successful nonce search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningOutcome {
    /// Winning nonce.
    pub nonce: u64,
    /// Block hash at the winning nonce.
    pub hash: Hash,
    /// Nonces tried in order, including the winner.
    pub attempts: u64,
}

/// Block miner.
pub struct Miner {
    /// PoW configuration.
    config: PowConfig,
    /// Worker pool, present only when mining on more than one thread.
    pool: Option<ThreadPool>,
}

impl Miner {
    /// Create a new miner with the given configuration.
    pub fn new(config: PowConfig) -> Result<Self> {
        config.validate()?;

        let pool = if config.threads > 1 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(config.threads)
                    .thread_name(|i| format!("powchain-miner-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self { config, pool })
    }

    /// Mine the block in place.
    ///
    /// On return `nonce` and `hash` agree and the hash meets the difficulty.
    pub fn mine(&self, block: &mut Block) -> MiningOutcome {
        let start = block.nonce;

        match &self.pool {
            None => block.mine(self.config.difficulty),
            Some(pool) => {
                let nonce = pool.install(|| self.search(block));
                block.nonce = nonce;
                block.rehash();
            }
        }

        let outcome = MiningOutcome {
            nonce: block.nonce,
            hash: block.hash,
            attempts: block.nonce - start + 1,
        };
        tracing::debug!(
            nonce = outcome.nonce,
            attempts = outcome.attempts,
            threads = self.config.threads,
            "nonce search finished"
        );
        outcome
    }

    /// Search consecutive batches; `find_first` keeps the lowest winner.
    fn search(&self, block: &Block) -> u64 {
        let difficulty = self.config.difficulty;
        let mut start = block.nonce;

        loop {
            let end = start.saturating_add(self.config.batch_size);
            let found = (start..end)
                .into_par_iter()
                .find_first(|nonce| block.hash_with_nonce(*nonce).meets_difficulty(difficulty));

            if let Some(nonce) = found {
                return nonce;
            }
            tracing::trace!(start, end, "no solution in batch");
            start = end;
        }
    }

    /// Check that a block's stored hash is genuine and meets the difficulty.
    pub fn verify_pow(&self, block: &Block) -> bool {
        block.hash.meets_difficulty(self.config.difficulty) && block.is_hash_consistent()
    }
}
