//! Redemption reconciliation.
//!
//! Applies every negative-points record against the same payer's earlier
//! positive records, oldest first, leaving a pool of non-negative lots.
//!
//! Maintains the invariant: a payer's running balance equals the sum of
//! `remaining` over that payer's active lots.

use crate::error::{LedgerError, Result};
use crate::ledger::ChronologicalLedger;
use crate::transaction::TransactionRecord;
use chrono::{DateTime, FixedOffset};
use log::debug;
use std::collections::{HashMap, VecDeque};

/// An earn record together with the points still unconsumed from it.
///
/// The record is never mutated; redemptions and spends only lower
/// `remaining`, so the originally earned amount stays available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lot {
    record: TransactionRecord,
    remaining: u64,
}

impl Lot {
    /// Opens a lot from a non-negative record.
    fn open(record: TransactionRecord) -> Self {
        let remaining = record.points.unsigned_abs();
        Lot { record, remaining }
    }

    pub fn record(&self) -> &TransactionRecord {
        &self.record
    }

    pub fn payer(&self) -> &str {
        &self.record.payer
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.record.timestamp
    }

    /// Points originally earned.
    pub fn earned(&self) -> u64 {
        self.record.points.unsigned_abs()
    }

    /// Points not yet consumed by redemptions or spends.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn consumed(&self) -> u64 {
        self.earned() - self.remaining
    }

    /// Returns `true` once every point of the lot is consumed.
    pub fn is_spent(&self) -> bool {
        self.remaining == 0
    }

    /// Takes up to `amount` points, returning how many were taken.
    pub(crate) fn consume(&mut self, amount: u64) -> u64 {
        let taken = amount.min(self.remaining);
        self.remaining -= taken;
        taken
    }
}

/// Lots left after every redemption has been applied.
///
/// Lots are in chronological order across all payers, spent lots included.
#[derive(Debug, Clone, Default)]
pub struct ReconciledPool {
    lots: Vec<Lot>,
    retired: usize,
}

impl ReconciledPool {
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub(crate) fn lots_mut(&mut self) -> &mut [Lot] {
        &mut self.lots
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Number of redemption records absorbed while reconciling.
    pub fn retired(&self) -> usize {
        self.retired
    }

    /// Sum of remaining points across all payers.
    pub fn total_available(&self) -> u128 {
        self.lots.iter().map(|lot| u128::from(lot.remaining)).sum()
    }
}

/// Per-payer state while reconciling.
#[derive(Debug, Default)]
struct PayerLedger {
    balance: u64,
    /// Indices into the pool of this payer's active lots, oldest first.
    active: VecDeque<usize>,
}

/// Reconciles redemptions against earlier earns of the same payer.
///
/// Records are processed once in chronological order. A redemption larger
/// than the payer's running balance fails the whole run with
/// [`LedgerError::InsufficientBalance`].
pub fn reconcile(ledger: ChronologicalLedger) -> Result<ReconciledPool> {
    let mut pool = ReconciledPool::default();
    let mut payers: HashMap<String, PayerLedger> = HashMap::new();

    for record in ledger.into_chronological() {
        if record.is_redemption() {
            redeem(&mut pool, &mut payers, &record)?;
            pool.retired += 1;
            continue;
        }

        let payer = payers.entry(record.payer.clone()).or_default();
        payer.balance = payer
            .balance
            .checked_add(record.points.unsigned_abs())
            .ok_or_else(|| LedgerError::PointsOverflow {
                payer: record.payer.clone(),
            })?;
        payer.active.push_back(pool.lots.len());
        pool.lots.push(Lot::open(record));
    }

    debug!(
        "Reconciled {} lots, {} redemptions retired",
        pool.lots.len(),
        pool.retired
    );
    Ok(pool)
}

fn redeem(
    pool: &mut ReconciledPool,
    payers: &mut HashMap<String, PayerLedger>,
    record: &TransactionRecord,
) -> Result<()> {
    let requested = record.points.unsigned_abs();
    let payer = payers.entry(record.payer.clone()).or_default();

    if requested > payer.balance {
        return Err(LedgerError::InsufficientBalance {
            payer: record.payer.clone(),
            requested,
            available: payer.balance,
        });
    }

    let mut outstanding = requested;
    while outstanding > 0 {
        let Some(&idx) = payer.active.front() else {
            break;
        };
        let lot = &mut pool.lots[idx];
        outstanding -= lot.consume(outstanding);
        if lot.is_spent() {
            payer.active.pop_front();
        }
    }
    payer.balance -= requested;

    debug!("Applied redemption {} ({} left)", record, payer.balance);
    Ok(())
}
