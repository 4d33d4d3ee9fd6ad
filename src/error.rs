//! Error types for the points ledger.

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while building, reconciling or spending a ledger.
///
/// Every variant is fatal to the current run.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Header does not name one of the required columns
    #[error("Column \"{0}\" does not exist in header")]
    MissingColumn(&'static str),

    /// Row shape or field format violation
    #[error("Invalid transaction at row {row}: {message}")]
    MalformedInput { row: usize, message: String },

    /// A redemption exceeds the payer's running balance at the time it applies
    #[error("Not enough points with payer {payer} to redeem {requested} (balance {available})")]
    InsufficientBalance {
        payer: String,
        requested: u64,
        available: u64,
    },

    /// Requested spend exceeds the points available across all payers
    #[error("Insufficient points")]
    InsufficientTotalPoints { requested: u64, available: u128 },

    /// A payer's running balance no longer fits in a u64
    #[error("Point balance overflow for payer {payer}")]
    PointsOverflow { payer: String },

    /// Spend amount is not a non-negative integer
    #[error("Invalid spend amount \"{0}\": expected a non-negative integer")]
    InvalidSpend(String),

    /// Missing command-line arguments
    #[error("Missing arguments. Usage: points-ledger <input.csv> <spend>")]
    MissingArgument,
}
