//! Error types for store operations.

use thiserror::Error;
use verireg_core::LedgerError;
use verireg_journal::JournalError;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Journal format or chain error.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),
    /// The file on disk no longer matches what this ledger wrote.
    #[error("journal diverged: {0}")]
    Diverged(String),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(io) | StoreError::Journal(JournalError::Io(io)) => LedgerError::Io(io),
            other => LedgerError::Backend(Box::new(other)),
        }
    }
}
