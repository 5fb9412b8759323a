use serde::{Deserialize, Serialize};
use std::fmt;
use verireg_canonical::{Fingerprint, Identity};

use crate::errors::LedgerError;
use crate::record::VerificationType;

/// One persisted registry mutation.
///
/// Replaying a ledger's entries in order rebuilds the registry exactly,
/// including enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEntry {
    /// Registry creation. Always the first entry, exactly once.
    Genesis {
        /// Owner, implicitly the first oracle.
        owner: Identity,
    },
    /// Owner added an oracle.
    OracleAuthorized {
        /// Caller (the owner at the time).
        by: Identity,
        /// Added oracle.
        oracle: Identity,
    },
    /// Owner removed an oracle.
    OracleDeauthorized {
        /// Caller (the owner at the time).
        by: Identity,
        /// Removed oracle.
        oracle: Identity,
    },
    /// Oracle stored a verification result.
    ResultStored {
        /// Oracle that wrote the result.
        attester: Identity,
        /// Fingerprint the result is keyed under.
        fingerprint: Fingerprint,
        /// Outcome.
        is_verified: bool,
        /// Kind of claim.
        verification_type: VerificationType,
        /// Free-text explanation.
        details: String,
    },
}

/// Discriminant of a [`LedgerEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// [`LedgerEntry::Genesis`].
    Genesis,
    /// [`LedgerEntry::OracleAuthorized`].
    OracleAuthorized,
    /// [`LedgerEntry::OracleDeauthorized`].
    OracleDeauthorized,
    /// [`LedgerEntry::ResultStored`].
    ResultStored,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Genesis => "genesis",
            EntryKind::OracleAuthorized => "oracle_authorized",
            EntryKind::OracleDeauthorized => "oracle_deauthorized",
            EntryKind::ResultStored => "result_stored",
        };
        f.write_str(name)
    }
}

impl LedgerEntry {
    /// Entry discriminant.
    pub fn kind(&self) -> EntryKind {
        match self {
            LedgerEntry::Genesis { .. } => EntryKind::Genesis,
            LedgerEntry::OracleAuthorized { .. } => EntryKind::OracleAuthorized,
            LedgerEntry::OracleDeauthorized { .. } => EntryKind::OracleDeauthorized,
            LedgerEntry::ResultStored { .. } => EntryKind::ResultStored,
        }
    }

    /// Identity that caused the entry.
    pub fn actor(&self) -> &Identity {
        match self {
            LedgerEntry::Genesis { owner } => owner,
            LedgerEntry::OracleAuthorized { by, .. } | LedgerEntry::OracleDeauthorized { by, .. } => {
                by
            }
            LedgerEntry::ResultStored { attester, .. } => attester,
        }
    }

    /// Fingerprint touched by the entry, if any.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            LedgerEntry::ResultStored { fingerprint, .. } => Some(fingerprint),
            _ => None,
        }
    }
}

/// Durable, append-only home for ledger entries.
///
/// The registry serializes every call to `append`; implementations need no
/// internal locking. An `append` that returns an error must leave nothing
/// that a later `replay` would return.
pub trait Ledger: Send {
    /// Returns every entry appended so far, oldest first.
    fn replay(&mut self) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Durably appends one entry.
    fn append(&mut self, entry: &LedgerEntry) -> Result<(), LedgerError>;
}

/// Volatile ledger for tests and embedded use.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries appended so far.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }
}

impl Ledger for MemoryLedger {
    fn replay(&mut self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.entries.clone())
    }

    fn append(&mut self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        self.entries.push(entry.clone());
        Ok(())
    }
}
