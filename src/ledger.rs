//! The chronological ledger: every transaction of a run, ordered on demand.

use crate::error::Result;
use crate::transaction::{ColumnLayout, TransactionRecord};
use csv::{ReaderBuilder, Trim};
use log::debug;
use std::io::Read;

/// All transactions of a single run.
///
/// Records are kept in input order. [`ChronologicalLedger::into_chronological`]
/// yields them ordered by timestamp, keeping input order for records at the
/// same instant so that runs are deterministic.
#[derive(Debug, Clone, Default)]
pub struct ChronologicalLedger {
    records: Vec<TransactionRecord>,
}

impl ChronologicalLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        ChronologicalLedger {
            records: Vec::new(),
        }
    }

    /// Creates a ledger from records in input order.
    pub fn from_records(records: Vec<TransactionRecord>) -> Self {
        ChronologicalLedger { records }
    }

    /// Reads a ledger from CSV with a `payer,points,timestamp` header.
    ///
    /// Header names are case-insensitive and may come in any order. Blank
    /// lines are skipped. Reading stops at the first invalid row; no partial
    /// ledger is returned.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let layout = ColumnLayout::from_headers(csv_reader.headers()?)?;
        let mut ledger = ChronologicalLedger::new();

        for result in csv_reader.records() {
            let fields = result?;
            // Line of the row in the input, counting skipped blank lines
            let row_num = fields.position().map_or(0, |p| p.line() as usize);
            ledger.push(TransactionRecord::from_row(&layout, &fields, row_num)?);
        }

        debug!("Read {} transactions from CSV", ledger.len());
        Ok(ledger)
    }

    /// Appends a record.
    pub fn push(&mut self, record: TransactionRecord) {
        self.records.push(record);
    }

    /// Records in input order.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Signed sum of every record's points.
    pub fn total_points(&self) -> i128 {
        self.records.iter().map(|r| i128::from(r.points)).sum()
    }

    /// Consumes the ledger, returning records ascending by timestamp.
    ///
    /// Timestamps compare as instants, so offsets are taken into account.
    pub fn into_chronological(mut self) -> Vec<TransactionRecord> {
        // `sort_by_key` is stable, ties keep input order
        self.records.sort_by_key(|r| r.timestamp);
        self.records
    }
}

impl FromIterator<TransactionRecord> for ChronologicalLedger {
    fn from_iter<I: IntoIterator<Item = TransactionRecord>>(iter: I) -> Self {
        ChronologicalLedger {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ChronologicalLedger {
    type Item = TransactionRecord;
    type IntoIter = std::vec::IntoIter<TransactionRecord>;

    /// Iterates in input order.
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl Extend<TransactionRecord> for ChronologicalLedger {
    fn extend<I: IntoIterator<Item = TransactionRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}
