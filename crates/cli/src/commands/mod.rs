//! CLI commands module.

use anyhow::Result;
use clap::Subcommand;

mod demo;
mod keygen;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a sign, mine and tamper walkthrough on a fresh ledger
    Demo(demo::DemoArgs),
    /// Generate a new keypair
    Keygen(keygen::KeygenArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Demo(args) => demo::run(args),
        Commands::Keygen(args) => keygen::run(args),
    }
}
