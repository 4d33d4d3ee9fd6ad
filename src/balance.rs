//! Per-payer balance aggregation and output.

use crate::error::Result;
use crate::reconcile::ReconciledPool;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

/// Final points held for one payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayerBalance {
    pub payer: String,
    pub points: u64,
}

/// Remaining points per payer after a run.
///
/// Every payer present in the pool is listed, including payers whose lots
/// are all spent. Payers appear in the order of their oldest lot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceSummary {
    balances: Vec<PayerBalance>,
}

impl BalanceSummary {
    /// Balance for `payer`, if the payer appears in the summary.
    pub fn get(&self, payer: &str) -> Option<u64> {
        self.balances
            .iter()
            .find(|b| b.payer == payer)
            .map(|b| b.points)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PayerBalance> {
        self.balances.iter()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all payer balances.
    pub fn total(&self) -> u128 {
        self.balances.iter().map(|b| u128::from(b.points)).sum()
    }

    /// Writes the summary as `payer,points` CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for balance in &self.balances {
            csv_writer.serialize(balance)?;
        }
        if self.balances.is_empty() {
            csv_writer.write_record(["payer", "points"])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a BalanceSummary {
    type Item = &'a PayerBalance;
    type IntoIter = std::slice::Iter<'a, PayerBalance>;

    fn into_iter(self) -> Self::IntoIter {
        self.balances.iter()
    }
}

/// Sums remaining points per payer over every lot in the pool.
pub fn aggregate(pool: &ReconciledPool) -> BalanceSummary {
    let mut balances: Vec<PayerBalance> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for lot in pool.lots() {
        let slot = *index.entry(lot.payer()).or_insert_with(|| {
            balances.push(PayerBalance {
                payer: lot.payer().to_string(),
                points: 0,
            });
            balances.len() - 1
        });
        // A payer's lots sum to at most its running balance, which fits in u64
        balances[slot].points += lot.remaining();
    }

    BalanceSummary { balances }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocate::allocate;
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

    #[test]
    fn test_aggregate_sums_lots_per_payer() {
        let pool = pool(&[
            ("A", 100, "2020-10-31T10:00:00Z"),
            ("B", 50, "2020-10-31T11:00:00Z"),
            ("A", 25, "2020-10-31T12:00:00Z"),
        ]);

        let summary = aggregate(&pool);
        assert_eq!(summary.get("A"), Some(125));
        assert_eq!(summary.get("B"), Some(50));
        assert_eq!(summary.get("C"), None);
        assert_eq!(summary.total(), 175);
    }

    #[test]
    fn test_summary_iterates_by_reference() {
        let pool = pool(&[
            ("A", 100, "2020-10-31T10:00:00Z"),
            ("B", 50, "2020-10-31T11:00:00Z"),
        ]);
        let summary = aggregate(&pool);

        let mut seen = Vec::new();
        for balance in &summary {
            seen.push((balance.payer.as_str(), balance.points));
        }
        assert_eq!(seen, vec![("A", 100), ("B", 50)]);
    }

    #[test]
    fn test_aggregate_keeps_fully_spent_payers() {
        let mut pool = pool(&[
            ("A", 100, "2020-10-31T10:00:00Z"),
            ("B", 50, "2020-10-31T11:00:00Z"),
        ]);
        allocate(&mut pool, 100).unwrap();

        let summary = aggregate(&pool);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.get("A"), Some(0));
        assert_eq!(summary.get("B"), Some(50));
    }

    #[test]
    fn test_aggregate_orders_payers_by_oldest_lot() {
        let pool = pool(&[
            ("LATE", 1, "2020-11-02T10:00:00Z"),
            ("EARLY", 1, "2020-10-31T10:00:00Z"),
            ("MIDDLE", 1, "2020-11-01T10:00:00Z"),
        ]);

        let payers: Vec<_> = aggregate(&pool).iter().map(|b| b.payer.clone()).collect();
        assert_eq!(payers, vec!["EARLY", "MIDDLE", "LATE"]);
    }

    #[test]
    fn test_write_csv() {
        let pool = pool(&[
            ("DANNON", 1000, "2020-10-31T10:00:00Z"),
            ("MILLER COORS", 5300, "2020-10-31T11:00:00Z"),
        ]);

        let mut output = Vec::new();
        aggregate(&pool).write_csv(&mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(output_str, "payer,points\nDANNON,1000\nMILLER COORS,5300\n");
    }

    #[test]
    fn test_write_csv_empty_summary_has_header() {
        let mut output = Vec::new();
        BalanceSummary::default().write_csv(&mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "payer,points\n");
    }
}
