//! Transaction mempool for pending transactions.
//!
//! The mempool holds admitted transactions, in arrival order, until the next
//! block seals all of them at once. It is unbounded: admission is decided by
//! validation alone.

use powchain_core::Transaction;

/// Transaction mempool.
#[derive(Debug, Default)]
pub struct Mempool {
    /// Pending transactions in arrival order.
    transactions: Vec<Transaction>,
}

impl Mempool {
    /// Create an empty mempool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of transactions in the mempool.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if the mempool is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Append a transaction. Admission checks happen before this call.
    pub fn add(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Pending transactions in arrival order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Remove and return every pending transaction, leaving the mempool empty.
    pub fn take_all(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powchain_core::{Address, Keypair};

    fn transfer(keypair: &Keypair, amount: u64) -> Transaction {
        Transaction::transfer(keypair.address(), Address::from_bytes([2u8; 32]), amount)
            .signed(keypair)
            .unwrap()
    }

    #[test]
    fn test_mempool_add_preserves_order() {
        let mut mempool = Mempool::new();
        let keypair = Keypair::generate();

        let tx1 = transfer(&keypair, 100);
        let tx2 = transfer(&keypair, 50);

        mempool.add(tx1.clone());
        mempool.add(tx2.clone());

        assert_eq!(mempool.len(), 2);
        assert_eq!(mempool.transactions(), &[tx1, tx2]);
    }

    #[test]
    fn test_mempool_allows_repeated_payment() {
        let mut mempool = Mempool::new();
        let keypair = Keypair::generate();
        let tx = transfer(&keypair, 10);

        mempool.add(tx.clone());
        mempool.add(tx);
        assert_eq!(mempool.len(), 2);
    }

    #[test]
    fn test_mempool_take_all() {
        let mut mempool = Mempool::new();
        let keypair = Keypair::generate();
        mempool.add(transfer(&keypair, 1));
        mempool.add(transfer(&keypair, 2));

        let taken = mempool.take_all();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].amount(), 1);
        assert!(mempool.is_empty());
    }

    #[test]
    fn test_mempool_is_unbounded() {
        let mut mempool = Mempool::new();
        let keypair = Keypair::generate();
        let tx = transfer(&keypair, 1);

        for _ in 0..20_001 {
            mempool.add(tx.clone());
        }
        assert_eq!(mempool.len(), 20_001);
    }
}
