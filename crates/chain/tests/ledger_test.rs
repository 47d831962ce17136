use powchain_chain::{Blockchain, BlockchainConfig};
use powchain_consensus::ValidationError;
use powchain_core::{Address, Keypair, Transaction};

fn pay(from: &Keypair, to: Address, amount: u64) -> Transaction {
    Transaction::transfer(from.address(), to, amount)
        .signed(from)
        .unwrap()
}

#[test]
fn test_transfer_and_reward_scenario() {
    let a = Keypair::generate();
    let b = Keypair::generate();
    let c = Keypair::generate();

    let mut ledger = Blockchain::new();
    assert_eq!(ledger.blocks().len(), 1);

    ledger.add_transaction(pay(&a, b.address(), 100)).unwrap();
    ledger.add_transaction(pay(&a, b.address(), 50)).unwrap();
    ledger.mine_pending_transactions(&c.address()).unwrap();

    assert_eq!(ledger.balance_of(&c.address()), 100);
    assert_eq!(ledger.balance_of(&a.address()), -150);
    assert_eq!(ledger.balance_of(&b.address()), 150);

    ledger.mine_pending_transactions(&c.address()).unwrap();
    assert_eq!(ledger.balance_of(&c.address()), 200);
    assert_eq!(ledger.blocks().len(), 3);
    assert!(ledger.is_chain_valid());
}

#[test]
fn test_each_mine_appends_one_linked_block() {
    let miner = Keypair::generate();
    let mut ledger = Blockchain::new();

    for round in 0..4u64 {
        if round % 2 == 1 {
            ledger
                .add_transaction(pay(&miner, Address::from_bytes([7u8; 32]), round))
                .unwrap();
        }
        let len_before = ledger.blocks().len();
        let tip_before = ledger.latest_block().hash;

        ledger.mine_pending_transactions(&miner.address()).unwrap();

        assert_eq!(ledger.blocks().len(), len_before + 1);
        assert!(ledger.pending_transactions().is_empty());
        assert_eq!(ledger.latest_block().previous_hash, tip_before);
        assert!(ledger.latest_block().hash.to_hex().starts_with("00"));
        assert!(ledger.is_chain_valid());
    }
}

#[test]
fn test_balances_sum_to_total_rewards() {
    let wallets: Vec<Keypair> = (0..3).map(|_| Keypair::generate()).collect();
    let mut ledger = Blockchain::new();

    for (i, sender) in wallets.iter().enumerate() {
        let recipient = wallets[(i + 1) % wallets.len()].address();
        ledger
            .add_transaction(pay(sender, recipient, 10 * (i as u64 + 1)))
            .unwrap();
        ledger.add_transaction(pay(sender, recipient, 3)).unwrap();
        ledger.mine_pending_transactions(&wallets[i].address()).unwrap();
    }

    let total: i128 = ledger.balances().values().sum();
    assert_eq!(total, 3 * i128::from(ledger.mining_reward()));
    assert_eq!(total as u128, ledger.total_issued());

    let per_address: i128 = wallets
        .iter()
        .map(|w| ledger.balance_of(&w.address()))
        .sum();
    assert_eq!(per_address, total);
}

#[test]
fn test_admission_has_no_pool_limit() {
    let wallet = Keypair::generate();
    let tx = pay(&wallet, Address::from_bytes([3u8; 32]), 1);
    let mut ledger = Blockchain::new();

    for _ in 0..10_001 {
        ledger.add_transaction(tx.clone()).unwrap();
    }

    assert_eq!(ledger.pending_transactions().len(), 10_001);
}

#[test]
fn test_tampered_history_invalidates_chain() {
    let wallet = Keypair::generate();
    let mut ledger = Blockchain::new();

    ledger
        .add_transaction(pay(&wallet, Address::from_bytes([1u8; 32]), 10))
        .unwrap();
    ledger.mine_pending_transactions(&wallet.address()).unwrap();
    ledger.mine_pending_transactions(&wallet.address()).unwrap();
    assert!(ledger.is_chain_valid());

    if let Transaction::Transfer(tx) = &mut ledger.blocks_mut()[1].transactions[0] {
        tx.amount = 1;
    }

    assert!(!ledger.is_chain_valid());
    assert!(matches!(
        ledger.validate_chain(),
        Err(ValidationError::InvalidTransactions { index: 1 })
    ));
}

#[test]
fn test_rehashing_a_tampered_block_breaks_the_next_link() {
    let wallet = Keypair::generate();
    let mut ledger = Blockchain::new();
    ledger.mine_pending_transactions(&wallet.address()).unwrap();
    ledger.mine_pending_transactions(&wallet.address()).unwrap();

    let block = &mut ledger.blocks_mut()[1];
    if let Transaction::Reward(tx) = &mut block.transactions[0] {
        tx.amount = 1_000_000;
    }
    block.mine(2);

    assert!(matches!(
        ledger.validate_chain(),
        Err(ValidationError::BrokenLink { index: 2 })
    ));
}

#[test]
fn test_custom_difficulty_and_reward() {
    let config = BlockchainConfig {
        difficulty: 3,
        mining_reward: 25,
        mining_threads: 2,
        ..BlockchainConfig::default()
    };
    let mut ledger = Blockchain::with_config(config).unwrap();
    let wallet = Keypair::generate();

    ledger.mine_pending_transactions(&wallet.address()).unwrap();

    assert!(ledger.latest_block().hash.to_hex().starts_with("000"));
    assert_eq!(ledger.balance_of(&wallet.address()), 25);
    assert!(ledger.is_chain_valid());
}
