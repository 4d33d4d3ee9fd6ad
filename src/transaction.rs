//! Transaction models for CSV parsing and internal representation.

use crate::error::{LedgerError, Result};
use chrono::{DateTime, FixedOffset};
use csv::StringRecord;
use std::fmt;

/// Number of fields every CSV row, header included, must carry.
const FIELD_COUNT: usize = 3;

/// A validated point transaction.
///
/// Positive `points` are earned from the payer, negative `points` are a
/// redemption taken back out by the same payer. Records are immutable once
/// built; reconciliation and spending track consumption separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Payer issuing or redeeming the points. Never empty.
    pub payer: String,

    /// Signed point delta.
    pub points: i64,

    /// When the transaction happened, with its original UTC offset.
    pub timestamp: DateTime<FixedOffset>,
}

impl TransactionRecord {
    /// Creates a record, rejecting an empty payer name.
    ///
    /// Records built outside CSV input report row 0 on error.
    pub fn new(
        payer: impl Into<String>,
        points: i64,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<Self> {
        let payer = payer.into();
        if payer.trim().is_empty() {
            return Err(LedgerError::MalformedInput {
                row: 0,
                message: "payer must not be empty".to_string(),
            });
        }

        Ok(TransactionRecord {
            payer,
            points,
            timestamp,
        })
    }

    /// Returns `true` for a negative-points record.
    pub fn is_redemption(&self) -> bool {
        self.points < 0
    }

    /// Parses a data row laid out according to `layout`.
    ///
    /// `row` is the 1-based line number used in error messages.
    pub fn from_row(layout: &ColumnLayout, fields: &StringRecord, row: usize) -> Result<Self> {
        check_field_count(fields, row)?;

        let malformed = |message: String| LedgerError::MalformedInput { row, message };

        let payer = fields.get(layout.payer).unwrap_or_default().trim();
        if payer.is_empty() {
            return Err(malformed("payer must not be empty".to_string()));
        }

        let raw_points = fields.get(layout.points).unwrap_or_default().trim();
        let points = raw_points
            .parse::<i64>()
            .map_err(|_| malformed(format!("points must be an integer, got \"{}\"", raw_points)))?;

        let raw_timestamp = fields.get(layout.timestamp).unwrap_or_default().trim();
        let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| {
            malformed(format!(
                "timestamp must look like YYYY-MM-DDTHH:MM:SS+HH:MM, got \"{}\"",
                raw_timestamp
            ))
        })?;

        Ok(TransactionRecord {
            payer: payer.to_string(),
            points,
            timestamp,
        })
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:+} @ {}",
            self.payer,
            self.points,
            self.timestamp.to_rfc3339()
        )
    }
}

/// Accepted timestamp layout, `2020-11-02T14:00:00+00:00` or `+0000`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Parses a timestamp such as `2020-11-02T14:00:00-05:00`.
///
/// A trailing uppercase `Z` stands for UTC. Fractional seconds, a space
/// instead of `T` and lowercase designators are rejected.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.chars().any(char::is_whitespace) {
        return None;
    }

    match raw.strip_suffix('Z') {
        Some(utc) => DateTime::parse_from_str(&format!("{}+00:00", utc), TIMESTAMP_FORMAT).ok(),
        None => DateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok(),
    }
}

/// Positions of the required columns inside a CSV row.
///
/// Column names are matched case-insensitively and may appear in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub payer: usize,
    pub points: usize,
    pub timestamp: usize,
}

impl ColumnLayout {
    /// Resolves column positions from the header row.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        check_field_count(headers, 1)?;

        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(LedgerError::MissingColumn(name))
        };

        Ok(ColumnLayout {
            payer: find("payer")?,
            points: find("points")?,
            timestamp: find("timestamp")?,
        })
    }
}

fn check_field_count(fields: &StringRecord, row: usize) -> Result<()> {
    if fields.len() != FIELD_COUNT {
        return Err(LedgerError::MalformedInput {
            row,
            message: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    }
    Ok(())
}
