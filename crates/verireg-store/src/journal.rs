//! Journal-backed [`Ledger`] implementation.

use std::path::{Path, PathBuf};

use verireg_canonical::Canonicalizer;
use verireg_core::{Ledger, LedgerEntry, LedgerError};
use verireg_journal::{
    verify_chain, ChainHead, JournalReader, JournalWriter, ReadMode, WriteOptions,
};

use crate::error::StoreError;

/// How a [`JournalLedger`] opens its file.
#[derive(Debug, Clone)]
pub struct LedgerOptions {
    /// `Permissive` drops a torn final frame (e.g. after a crash mid-append)
    /// instead of refusing to open. Default: `Strict`.
    pub read_mode: ReadMode,
    /// fsync after every append. Default: true.
    pub sync: bool,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            read_mode: ReadMode::Strict,
            sync: true,
        }
    }
}

/// Ledger stored as a hash-chained journal file.
///
/// Opening validates the whole chain. Appends seal each entry onto the
/// current head, so the file stays verifiable with
/// [`verify_chain`](verireg_journal::verify_chain) at all times.
pub struct JournalLedger {
    path: PathBuf,
    writer: JournalWriter,
    head: ChainHead,
    canonicalizer: Canonicalizer,
}

impl JournalLedger {
    /// Opens `path`, creating an empty journal if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P, options: LedgerOptions) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let canonicalizer = Canonicalizer::new();
        let mut writer = JournalWriter::open(
            &path,
            WriteOptions {
                sync: options.sync,
                create: true,
            },
        )?;

        let mut reader = JournalReader::open(&path, options.read_mode)?;
        let records = reader.read_all()?;
        if reader.position() < writer.len() {
            tracing::warn!(
                path = %path.display(),
                valid = reader.position(),
                len = writer.len(),
                "dropping torn journal tail"
            );
            writer.truncate(reader.position())?;
        }
        let head = verify_chain(&records, &canonicalizer)?;
        tracing::debug!(path = %path.display(), records = head.next_seq(), "journal ledger opened");

        Ok(Self {
            path,
            writer,
            head,
            canonicalizer,
        })
    }

    /// Path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records in the journal.
    pub fn len(&self) -> u64 {
        self.head.next_seq()
    }

    /// True when the journal holds no records.
    pub fn is_empty(&self) -> bool {
        self.head.next_seq() == 0
    }

    /// Opens an independent reader over the journal file.
    pub fn reader(&self) -> Result<JournalReader, StoreError> {
        Ok(JournalReader::open(&self.path, ReadMode::Strict)?)
    }

    fn read_entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        let records = self.reader()?.read_all()?;
        let head = verify_chain(&records, &self.canonicalizer)?;
        if head != self.head {
            return Err(StoreError::Diverged(format!(
                "expected {} records, found {}",
                self.head.next_seq(),
                head.next_seq()
            )));
        }
        Ok(records.into_iter().map(|record| record.entry).collect())
    }

    fn append_entry(&mut self, entry: &LedgerEntry) -> Result<(), StoreError> {
        let record = self.head.seal(entry.clone(), &self.canonicalizer)?;
        self.writer.append_record(&record)?;
        self.head.advance(&record);
        Ok(())
    }
}

impl Ledger for JournalLedger {
    fn replay(&mut self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.read_entries()?)
    }

    fn append(&mut self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        Ok(self.append_entry(entry)?)
    }
}
