//! # Sirocco CLI
//!
//! Command-line interface for the Sirocco trading engine.
//!
//! Runs a backtest from a strategy-definition file and a bar file,
//! printing the resulting metrics as a table or JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

use commands::backtest;

/// Sirocco - bar-driven trading engine and backtester
#[derive(Parser)]
#[command(name = "sirocco")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a backtest
    Backtest(backtest::BacktestArgs),

    /// Show build information
    Info,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Backtest(args) => backtest::run(&args).await?,
        Commands::Info => print_info(),
    }

    Ok(())
}

fn print_info() {
    println!("Sirocco Trading Engine");
    println!("======================");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Built-in strategies:");
    println!("  - BuyOnFirstBar (smoke tests)");
    println!("  - SmaCross");
    println!();
    println!("Simulation model:");
    println!("  - T+1 fills at next bar open");
    println!("  - Bid/ask spread, adverse stop slippage");
    println!("  - Per-lot commission on entry and exit");
}
