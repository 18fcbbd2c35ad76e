//! Headless battle runner.
//!
//! Loads a content directory, lets the AI fight the scenario on both sides
//! and reports the result. Run with: `cargo run -p tactics-cli -- play`

mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Play};

/// Turn-based hex battles from the command line
#[derive(Parser)]
#[command(name = "tactics")]
#[command(about = "Run and inspect tactical battles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Auto-play the scenario from a content directory
    Play(Play),

    /// Load and cross-check a content directory without fighting
    Check(Check),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (TACTICS_DATA_DIR, RUST_LOG, ...)
    let _ = dotenvy::dotenv();

    logging::setup_logging();

    let cli = Cli::parse();

    match cli.command {
        Command::Play(cmd) => cmd.execute().await,
        Command::Check(cmd) => cmd.execute(),
    }
}
