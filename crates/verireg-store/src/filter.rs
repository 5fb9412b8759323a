//! Record filtering for selective iteration.

use crate::error::StoreError;
use crate::traits::RecordReader;
use verireg_canonical::{Fingerprint, Identity};
use verireg_core::EntryKind;
use verireg_journal::JournalRecord;

/// Predicate over journal records.
pub trait EntryFilter {
    /// Returns true if the record matches.
    fn matches(&self, record: &JournalRecord) -> bool;
}

/// Matches one entry kind.
#[derive(Debug, Clone)]
pub struct KindFilter {
    /// Kind to match.
    pub kind: EntryKind,
}

impl EntryFilter for KindFilter {
    fn matches(&self, record: &JournalRecord) -> bool {
        record.entry.kind() == self.kind
    }
}

/// Matches stored results for one fingerprint.
#[derive(Debug, Clone)]
pub struct FingerprintFilter {
    /// Fingerprint to match.
    pub fingerprint: Fingerprint,
}

impl EntryFilter for FingerprintFilter {
    fn matches(&self, record: &JournalRecord) -> bool {
        record.entry.fingerprint() == Some(&self.fingerprint)
    }
}

/// Matches entries caused by one identity.
#[derive(Debug, Clone)]
pub struct ActorFilter {
    /// Acting identity to match.
    pub actor: Identity,
}

impl EntryFilter for ActorFilter {
    fn matches(&self, record: &JournalRecord) -> bool {
        *record.entry.actor() == self.actor
    }
}

/// All filters must match.
pub struct AndFilter {
    /// Filters to combine.
    pub filters: Vec<Box<dyn EntryFilter>>,
}

impl EntryFilter for AndFilter {
    fn matches(&self, record: &JournalRecord) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }
}

/// Any filter may match.
pub struct OrFilter {
    /// Filters to combine.
    pub filters: Vec<Box<dyn EntryFilter>>,
}

impl EntryFilter for OrFilter {
    fn matches(&self, record: &JournalRecord) -> bool {
        self.filters.iter().any(|f| f.matches(record))
    }
}

/// Reader that yields only matching records.
#[derive(Debug)]
pub struct FilteredReader<R: RecordReader, F: EntryFilter> {
    reader: R,
    filter: F,
}

impl<R: RecordReader, F: EntryFilter> FilteredReader<R, F> {
    /// Wraps `reader`.
    pub fn new(reader: R, filter: F) -> Self {
        Self { reader, filter }
    }
}

impl<R: RecordReader, F: EntryFilter> RecordReader for FilteredReader<R, F> {
    fn read_next(&mut self) -> Result<Option<JournalRecord>, StoreError> {
        while let Some(record) = self.reader.read_next()? {
            if self.filter.matches(&record) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}
