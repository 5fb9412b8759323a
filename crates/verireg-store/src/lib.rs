//! Durable storage for the verireg registry.
//!
//! This crate provides:
//! - [`JournalLedger`], a [`Ledger`](verireg_core::Ledger) over a
//!   hash-chained `verireg-journal` file
//! - Record filters for selective iteration
//! - History views: every attestation of a fingerprint and every oracle
//!   membership change, including the ones the live registry no longer shows

#![deny(missing_docs)]

/// Error types for store operations.
pub mod error;
/// Record filtering API.
pub mod filter;
/// Journal-backed ledger.
pub mod journal;
/// Reader trait.
pub mod traits;
/// History views.
pub mod view;

pub use error::StoreError;
pub use filter::{ActorFilter, AndFilter, EntryFilter, FilteredReader, FingerprintFilter, KindFilter, OrFilter};
pub use journal::{JournalLedger, LedgerOptions};
pub use traits::RecordReader;
pub use verireg_journal::ReadMode;
pub use view::{attestation_history, oracle_timeline, Attestation, MembershipChange};
