//! Spend allocation across the reconciled pool, oldest points first.

use crate::error::{LedgerError, Result};
use crate::reconcile::ReconciledPool;
use log::debug;

/// Points a spend drew from one payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduction {
    pub payer: String,
    pub points: u64,
}

/// Breakdown of a completed spend.
///
/// Deductions are listed in the order payers were first drawn from and
/// always sum to `requested`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendReceipt {
    pub requested: u64,
    pub deductions: Vec<Deduction>,
}

impl SpendReceipt {
    /// Points drawn from `payer`, or 0 if the spend never reached them.
    pub fn deducted_from(&self, payer: &str) -> u64 {
        self.deductions
            .iter()
            .find(|d| d.payer == payer)
            .map_or(0, |d| d.points)
    }

    fn record(&mut self, payer: &str, points: u64) {
        match self.deductions.iter_mut().find(|d| d.payer == payer) {
            Some(deduction) => deduction.points += points,
            None => self.deductions.push(Deduction {
                payer: payer.to_string(),
                points,
            }),
        }
    }
}

/// Spends `amount` points from the pool, oldest lots first across all payers.
///
/// Fails with [`LedgerError::InsufficientTotalPoints`] before touching any
/// lot when the pool holds fewer than `amount` points.
pub fn allocate(pool: &mut ReconciledPool, amount: u64) -> Result<SpendReceipt> {
    let available = pool.total_available();
    if available < u128::from(amount) {
        return Err(LedgerError::InsufficientTotalPoints {
            requested: amount,
            available,
        });
    }

    let mut receipt = SpendReceipt {
        requested: amount,
        deductions: Vec::new(),
    };
    let mut outstanding = amount;

    for lot in pool.lots_mut() {
        if outstanding == 0 {
            break;
        }
        let taken = lot.consume(outstanding);
        if taken == 0 {
            continue;
        }
        outstanding -= taken;
        debug!(
            "Spent {} points from {} lot at {}",
            taken,
            lot.payer(),
            lot.timestamp().to_rfc3339()
        );
        receipt.record(lot.payer(), taken);
    }

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ChronologicalLedger;
    use crate::reconcile::reconcile;
    use crate::transaction::{parse_timestamp, TransactionRecord};

    fn pool(records: &[(&str, i64, &str)]) -> ReconciledPool {
        let ledger = records
            .iter()
            .map(|&(payer, points, ts)| {
                TransactionRecord::new(payer, points, parse_timestamp(ts).unwrap()).unwrap()
            })
            .collect::<ChronologicalLedger>();
        reconcile(ledger).unwrap()
    }

    fn remaining(pool: &ReconciledPool) -> Vec<u64> {
        pool.lots().iter().map(|lot| lot.remaining()).collect()
    }

    #[test]
    fn test_spend_drains_oldest_lot_first() {
        let mut pool = pool(&[
            ("X", 100, "2020-10-31T10:00:00Z"),
            ("X", 50, "2020-10-31T11:00:00Z"),
        ]);

        let receipt = allocate(&mut pool, 120).unwrap();
        assert_eq!(remaining(&pool), vec![0, 30]);
        assert_eq!(receipt.deducted_from("X"), 120);
    }

    #[test]
    fn test_spend_crosses_payers_in_time_order() {
        let mut pool = pool(&[
            ("A", 100, "2020-10-31T10:00:00Z"),
            ("B", 200, "2020-10-31T11:00:00Z"),
            ("A", 300, "2020-10-31T12:00:00Z"),
        ]);

        let receipt = allocate(&mut pool, 250).unwrap();
        assert_eq!(remaining(&pool), vec![0, 50, 300]);
        assert_eq!(
            receipt.deductions,
            vec![
                Deduction {
                    payer: "A".to_string(),
                    points: 100
                },
                Deduction {
                    payer: "B".to_string(),
                    points: 150
                },
            ]
        );
    }

    #[test]
    fn test_spend_skips_lots_emptied_by_redemptions() {
        let mut pool = pool(&[
            ("A", 100, "2020-10-31T10:00:00Z"),
            ("A", -100, "2020-10-31T10:30:00Z"),
            ("B", 80, "2020-10-31T11:00:00Z"),
        ]);

        let receipt = allocate(&mut pool, 30).unwrap();
        assert_eq!(remaining(&pool), vec![0, 50]);
        assert_eq!(receipt.deducted_from("A"), 0);
        assert_eq!(receipt.deducted_from("B"), 30);
    }

    #[test]
    fn test_spend_of_exact_total_empties_pool() {
        let mut pool = pool(&[
            ("A", 100, "2020-10-31T10:00:00Z"),
            ("B", 50, "2020-10-31T11:00:00Z"),
        ]);

        allocate(&mut pool, 150).unwrap();
        assert_eq!(pool.total_available(), 0);
    }

    #[test]
    fn test_zero_spend_changes_nothing() {
        let mut pool = pool(&[("A", 100, "2020-10-31T10:00:00Z")]);

        let receipt = allocate(&mut pool, 0).unwrap();
        assert_eq!(remaining(&pool), vec![100]);
        assert!(receipt.deductions.is_empty());
    }

    #[test]
    fn test_overspend_fails_without_mutation() {
        let mut pool = pool(&[("X", 100, "2020-10-31T10:00:00Z")]);

        let err = allocate(&mut pool, 150).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientTotalPoints {
                requested: 150,
                available: 100
            }
        ));
        assert_eq!(remaining(&pool), vec![100]);
    }
}
