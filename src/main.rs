//! Points Ledger CLI
//!
//! Reads payer point transactions from CSV, spends the requested amount
//! oldest-first and prints each payer's remaining balance as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transactions.csv 5000 > balances.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `info` to control logging verbosity

use points_ledger::{LedgerError, PointsEngine, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    match run() {
        Ok(()) => {}
        Err(LedgerError::InsufficientTotalPoints { .. }) => {
            println!("Insufficient points");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(LedgerError::MissingArgument);
    }

    let spend = parse_spend(&args[2])?;

    let input_path = &args[1];
    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let mut engine = PointsEngine::new();
    engine.process_csv(reader)?;
    let settlement = engine.settle(spend)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    settlement.summary.write_csv(handle)?;

    Ok(())
}

fn parse_spend(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| LedgerError::InvalidSpend(raw.to_string()))
}
