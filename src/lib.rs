//! # Points Ledger
//!
//! Reconciles rewards-point transactions from several payers and spends
//! points oldest-first across all of them.
//!
//! ## Design Principles
//!
//! - **Oldest points first**: redemptions drain a payer's oldest earns,
//!   spends drain the oldest earns of any payer
//! - **No negative balances**: a redemption larger than the payer's running
//!   balance fails the run
//! - **Audit trail**: records are never mutated; consumption is tracked per lot
//! - **Deterministic output**: payers listed in order of their oldest earn
//!
//! ## Example
//!
//! ```no_run
//! use points_ledger::PointsEngine;
//! use std::io::Cursor;
//!
//! let csv = "payer,points,timestamp\nDANNON,300,2020-10-31T10:00:00Z\n";
//! let mut engine = PointsEngine::new();
//! engine.process_csv(Cursor::new(csv)).unwrap();
//! let settlement = engine.settle(100).unwrap();
//! settlement.summary.write_csv(std::io::stdout()).unwrap();
//! ```

pub mod allocate;
pub mod balance;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod reconcile;
pub mod transaction;

pub use allocate::{allocate, Deduction, SpendReceipt};
pub use balance::{aggregate, BalanceSummary, PayerBalance};
pub use engine::{PointsEngine, Settlement};
pub use error::{LedgerError, Result};
pub use ledger::ChronologicalLedger;
pub use reconcile::{reconcile, Lot, ReconciledPool};
pub use transaction::{parse_timestamp, ColumnLayout, TransactionRecord};

use std::io::Read;

/// Reads transactions from CSV, spends `spend` points and returns the
/// remaining balance of every payer.
pub fn run<R: Read>(reader: R, spend: u64) -> Result<BalanceSummary> {
    let mut engine = PointsEngine::new();
    engine.process_csv(reader)?;
    Ok(engine.settle(spend)?.summary)
}
