//! Ledger orchestration for powchain.
//!
//! This crate brings the primitives together into a single-writer ledger:
//! - **Mempool**: ordered queue of admitted, not yet sealed transactions
//! - **Blockchain**: the chain itself, mining, balances and validation
//!
//! # Example
//!
//! ```rust,no_run
//! use powchain_chain::Blockchain;
//! use powchain_core::{Keypair, Transaction};
//!
//! let alice = Keypair::generate();
//! let bob = Keypair::generate();
//!
//! let mut ledger = Blockchain::new();
//!
//! // Mine once so alice has funds, then pay bob
//! ledger.mine_pending_transactions(&alice.address()).unwrap();
//! let tx = Transaction::transfer(alice.address(), bob.address(), 40)
//!     .signed(&alice)
//!     .unwrap();
//! ledger.add_transaction(tx).unwrap();
//! ledger.mine_pending_transactions(&alice.address()).unwrap();
//!
//! assert_eq!(ledger.balance_of(&bob.address()), 40);
//! assert!(ledger.is_chain_valid());
//! ```

pub mod blockchain;
pub mod mempool;

// Re-export commonly used types
pub use blockchain::{Blockchain, BlockchainConfig, BlockchainError, BlockchainStats};
pub use mempool::Mempool;
