//! Keypair generation command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use powchain_core::Keypair;

#[derive(Args)]
pub struct KeygenArgs {
    /// Print the keypair as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: KeygenArgs) -> Result<()> {
    let keypair = Keypair::generate();
    let address = keypair.address();

    if args.json {
        let key_json = serde_json::json!({
            "address": address.to_hex(),
            "private_key": hex::encode(keypair.private_key()),
        });
        println!("{}", serde_json::to_string_pretty(&key_json)?);
        return Ok(());
    }

    println!("{}", "Generated new keypair:".bold().cyan());
    println!();
    println!("  Address:     {}", address.to_hex().bright_yellow());
    println!(
        "  Private Key: {}",
        hex::encode(keypair.private_key()).bright_black()
    );
    println!();
    println!(
        "Pass the private key to {} to sign with this wallet.",
        "powchain demo --private-key".bright_cyan()
    );

    Ok(())
}
