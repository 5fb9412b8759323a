//! Hash-chained, append-only journal for verireg ledger entries.
//!
//! A journal file is a 16-byte header followed by length-prefixed frames.
//! Each `LedgerRecord` frame holds one JSON [`JournalRecord`]: a ledger
//! entry plus its sequence number, the previous record's digest, and its own
//! digest over the canonical form of those three.
//!
//! ```rust,no_run
//! use verireg_canonical::{Canonicalizer, Identity};
//! use verireg_core::LedgerEntry;
//! use verireg_journal::{verify_chain, ChainHead, JournalReader, JournalWriter, ReadMode, WriteOptions};
//!
//! let canonicalizer = Canonicalizer::new();
//! let mut head = ChainHead::new();
//! let record = head.seal(LedgerEntry::Genesis { owner: Identity::parse("human:owner")? }, &canonicalizer)?;
//! head.advance(&record);
//!
//! let mut writer = JournalWriter::open("registry.vrj", WriteOptions::default())?;
//! writer.append_record(&record)?;
//! writer.finish()?;
//!
//! let records = JournalReader::open("registry.vrj", ReadMode::Strict)?.read_all()?;
//! assert_eq!(verify_chain(&records, &canonicalizer)?, head);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Error types for journal operations.
pub mod errors;
/// Frame structure and serialization.
pub mod frame;
/// Journal reader implementation.
pub mod reader;
/// Chained record type and digest computation.
pub mod record;
/// Digest and linkage verification.
pub mod verification;
/// Journal writer implementation.
pub mod writer;

pub use errors::JournalError;
pub use frame::{FrameKind, JournalHeader, RecordFrame};
pub use reader::{JournalReader, ReadMode};
pub use record::{compute_digest, ChainHead, JournalRecord, ENTRY_DOMAIN};
pub use verification::{verify_chain, verify_record};
pub use writer::{JournalWriter, WriteOptions};
