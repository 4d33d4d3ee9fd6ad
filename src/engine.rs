//! Run orchestration.
//!
//! Drives one run through reconciliation, spend allocation and aggregation.
//! Every stage fails fast; a failed run exposes no partial balances.

use crate::allocate::{allocate, SpendReceipt};
use crate::balance::{aggregate, BalanceSummary};
use crate::error::Result;
use crate::ledger::ChronologicalLedger;
use crate::reconcile::reconcile;
use crate::transaction::TransactionRecord;
use log::{debug, info};
use std::io::Read;

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Settlement {
    /// Remaining points per payer.
    pub summary: BalanceSummary,

    /// Points the spend drew from each payer.
    pub receipt: SpendReceipt,
}

/// The points processing engine.
///
/// Collects transactions for a single run, then settles them against a
/// spend amount. The engine owns its records exclusively.
#[derive(Debug, Clone, Default)]
pub struct PointsEngine {
    ledger: ChronologicalLedger,
}

impl PointsEngine {
    /// Creates a new empty engine.
    pub fn new() -> Self {
        PointsEngine {
            ledger: ChronologicalLedger::new(),
        }
    }

    pub fn from_ledger(ledger: ChronologicalLedger) -> Self {
        PointsEngine { ledger }
    }

    /// Adds a single transaction.
    pub fn add_transaction(&mut self, record: TransactionRecord) {
        self.ledger.push(record);
    }

    /// Appends transactions read from CSV.
    ///
    /// Fails at the first malformed row; nothing from that input is kept.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let parsed = ChronologicalLedger::from_csv(reader)?;
        self.ledger.extend(parsed);
        Ok(())
    }

    pub fn ledger(&self) -> &ChronologicalLedger {
        &self.ledger
    }

    /// Reconciles redemptions, spends `spend` points oldest-first and
    /// returns the remaining balance of every payer.
    pub fn settle(self, spend: u64) -> Result<Settlement> {
        debug!(
            "Settling {} transactions (net {} points), spend {}",
            self.ledger.len(),
            self.ledger.total_points(),
            spend
        );

        let mut pool = reconcile(self.ledger)?;
        let receipt = allocate(&mut pool, spend)?;
        let summary = aggregate(&pool);

        info!(
            "Spent {} points across {} payers, {} points remain",
            spend,
            receipt.deductions.len(),
            summary.total()
        );

        Ok(Settlement { summary, receipt })
    }
}
