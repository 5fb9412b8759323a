use std::fmt;

use thiserror::Error;
use verireg_canonical::{Fingerprint, Identity};

/// Role a caller must hold for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Registry owner; manages oracle membership.
    Owner,
    /// Authorized oracle; writes verification results.
    Oracle,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => f.write_str("owner"),
            Role::Oracle => f.write_str("authorized oracle"),
        }
    }
}

/// Persistence failures reported by a [`Ledger`](crate::Ledger).
#[derive(Error, Debug)]
pub enum LedgerError {
    /// I/O error while reading or writing entries.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Backend-specific failure.
    #[error("ledger backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Registry error types.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Caller lacks the role the operation requires.
    #[error("unauthorized: {caller} is not the {required}")]
    Unauthorized {
        /// Identity that attempted the operation.
        caller: Identity,
        /// Role that was required.
        required: Role,
    },
    /// No record exists for the fingerprint.
    #[error("no verification record found for {0}")]
    NotFound(Fingerprint),
    /// Enumeration index is past the end.
    #[error("index {index} out of range (count {count})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current number of records.
        count: usize,
    },
    /// Malformed input: fingerprint width, type code, identity, details size.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A later write was refused by the configured overwrite policy.
    #[error("{fingerprint} already attested by {attester}")]
    AlreadyAttested {
        /// Fingerprint that already has a record.
        fingerprint: Fingerprint,
        /// Oracle that wrote the existing record.
        attester: Identity,
    },
    /// Invalid registry configuration.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    /// Persistence failed; registry state is unchanged.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    /// Replayed ledger violates a registry invariant.
    #[error("corrupt ledger: {0}")]
    Corrupt(String),
}

impl From<verireg_canonical::ValidationError> for RegistryError {
    fn from(err: verireg_canonical::ValidationError) -> Self {
        RegistryError::InvalidArgument(err.to_string())
    }
}
