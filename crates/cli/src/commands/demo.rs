//! Ledger walkthrough command.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use powchain_chain::{Blockchain, BlockchainConfig};
use powchain_core::{Block, Keypair, Transaction};

#[derive(Args)]
pub struct DemoArgs {
    /// Leading zero hex digits required of each block hash
    #[arg(short, long, default_value = "2")]
    difficulty: usize,

    /// Reward paid per mined block
    #[arg(short, long, default_value = "100")]
    reward: u64,

    /// Worker threads for mining
    #[arg(short, long, default_value = "1")]
    threads: usize,

    /// Amount sent from the wallet to a fresh recipient
    #[arg(short, long, default_value = "10")]
    amount: u64,

    /// Wallet private key (hex). A new one is generated if omitted
    #[arg(short, long)]
    private_key: Option<String>,
}

pub fn run(args: DemoArgs) -> Result<()> {
    let config = BlockchainConfig {
        difficulty: args.difficulty,
        mining_reward: args.reward,
        mining_threads: args.threads,
        ..BlockchainConfig::default()
    };
    let mut ledger = Blockchain::with_config(config).context("Failed to create ledger")?;

    let wallet = match &args.private_key {
        Some(key) => Keypair::from_private_hex(key).context("Invalid private key")?,
        None => Keypair::generate(),
    };
    let recipient = Keypair::generate().address();

    println!("{}", "powchain demo".bold().cyan());
    println!();
    println!("  Wallet:    {}", wallet.address().to_hex().bright_yellow());
    println!("  Recipient: {}", recipient.to_hex().bright_yellow());
    println!("  Difficulty: {}", ledger.difficulty().to_string().bright_cyan());

    // Sign and queue a payment
    let tx = Transaction::transfer(wallet.address(), recipient, args.amount)
        .signed(&wallet)
        .context("Failed to sign transaction")?;
    ledger
        .add_transaction(tx)
        .context("Failed to queue transaction")?;

    println!();
    println!(
        "{}  Queued transfer of {}",
        "✓".green().bold(),
        args.amount.to_string().bright_cyan()
    );

    println!();
    println!("{}", "Starting the miner...".bold());
    let block = ledger
        .mine_pending_transactions(&wallet.address())
        .context("Failed to mine block")?;
    print_block(1, block);

    println!();
    println!(
        "  Balance of wallet:    {}",
        ledger.balance_of(&wallet.address()).to_string().bright_cyan()
    );
    println!(
        "  Balance of recipient: {}",
        ledger.balance_of(&recipient).to_string().bright_cyan()
    );
    let stats = ledger.stats();
    println!(
        "  Height: {}, issued: {}, pending: {}",
        stats.height.to_string().bright_cyan(),
        stats.total_issued.to_string().bright_cyan(),
        stats.pending_transactions
    );
    print_validity(&ledger);

    // Rewrite history without re-mining
    println!();
    println!("{}", "Tampering with block 1...".bold());
    if let Some(Transaction::Transfer(tx)) = ledger.blocks_mut()[1].transactions.first_mut() {
        tx.amount = 1;
    }
    print_validity(&ledger);

    Ok(())
}

fn print_block(height: usize, block: &Block) {
    let mined_at = i64::try_from(block.timestamp)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| block.timestamp.to_string());

    println!("{}  Block {} mined", "✓".green().bold(), height);
    println!("    Hash:         {}", block.hash.to_hex().bright_yellow());
    println!("    Previous:     {}", block.previous_hash.to_hex().bright_black());
    println!("    Nonce:        {}", block.nonce.to_string().bright_cyan());
    println!("    Transactions: {}", block.tx_count());
    println!("    Mined at:     {}", mined_at);
}

fn print_validity(ledger: &Blockchain) {
    match ledger.validate_chain() {
        Ok(()) => println!("  Is chain valid? {}", "true".green().bold()),
        Err(err) => println!(
            "  Is chain valid? {} ({})",
            "false".red().bold(),
            err.to_string().bright_black()
        ),
    }
}
