//! Oracle-attested verification registry.
//!
//! This crate provides:
//! - Verification records keyed by content fingerprint
//! - Owner-managed oracle membership and oracle-only result storage
//! - Outbound events (`VerificationRequested`, `VerificationCompleted`, ...)
//! - A `Ledger` persistence seam with an in-memory implementation
//! - A reference-record oracle that attests claim documents
//!
//! Core invariants:
//! - A fingerprint is enumerated at most once, and iff it has a record
//! - Attesters were oracles when they wrote; revocation is not retroactive
//! - The owner is fixed at creation and never unset
//! - Mutations are applied one at a time; readers see consistent snapshots
//!
#![deny(missing_docs)]

/// Registry configuration and limits.
pub mod config;
/// Error types for registry operations.
pub mod errors;
/// Outbound events and sinks.
pub mod events;
/// Persistence seam and ledger entries.
pub mod ledger;
/// Reference-record oracle.
pub mod oracle;
/// Verification records and verification types.
pub mod record;
/// The registry service.
pub mod registry;
/// Pure registry state machine.
pub mod state;

pub use config::{ConfigError, OverwritePolicy, RegistryConfig};
pub use errors::{LedgerError, RegistryError, Role};
pub use events::{ChannelSink, EventLog, EventSink, NullSink, RegistryEvent, TracingSink};
pub use ledger::{EntryKind, Ledger, LedgerEntry, MemoryLedger};
pub use oracle::{
    Attestation, ClaimBook, EmploymentRecord, Finding, OracleError, ReferenceOracle,
    ReferenceRecords, UniversityRecord,
};
pub use record::{RequestId, VerificationRecord, VerificationType};
pub use registry::Registry;
pub use state::RegistryState;

pub use verireg_canonical::{Fingerprint, Identity};
