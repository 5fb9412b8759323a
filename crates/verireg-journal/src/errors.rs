use thiserror::Error;
use verireg_canonical::CanonicalizationError;

/// Errors that can occur during journal operations.
#[derive(Error, Debug)]
pub enum JournalError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid file header (magic, version, or flags).
    #[error("invalid journal header: {0}")]
    InvalidHeader(String),
    /// Invalid frame structure (reserved bytes or length).
    #[error("invalid frame at offset {offset}: {reason}")]
    InvalidFrame {
        /// Byte offset where the frame starts.
        offset: u64,
        /// Reason for invalidity.
        reason: String,
    },
    /// Payload exceeds the per-frame limit.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Actual payload size.
        size: usize,
        /// Maximum allowed size.
        max: u32,
    },
    /// Record payload is not a valid `JournalRecord`.
    #[error("malformed record payload: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Record could not be canonicalized for hashing.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    /// Record digest or linkage does not match the chain.
    #[error("chain broken at seq {seq}: {reason}")]
    ChainBroken {
        /// Sequence number of the offending record.
        seq: u64,
        /// What did not match.
        reason: String,
    },
    /// File has bytes but fewer than a header's worth.
    #[error("file is not empty; cannot initialize header")]
    FileNotEmpty,
    /// Truncated frame detected in strict mode.
    #[error("truncated frame at offset {offset}")]
    TruncatedFrame {
        /// Byte offset of the incomplete frame.
        offset: u64,
    },
}
