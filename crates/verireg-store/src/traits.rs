//! Reader abstraction shared by filters and views.

use crate::error::StoreError;
use verireg_journal::{JournalReader, JournalRecord};

/// Sequential source of journal records, oldest first.
pub trait RecordReader {
    /// Returns the next record, or `None` when exhausted.
    fn read_next(&mut self) -> Result<Option<JournalRecord>, StoreError>;
}

impl RecordReader for JournalReader {
    fn read_next(&mut self) -> Result<Option<JournalRecord>, StoreError> {
        Ok(self.read_record()?)
    }
}

impl RecordReader for std::vec::IntoIter<JournalRecord> {
    fn read_next(&mut self) -> Result<Option<JournalRecord>, StoreError> {
        Ok(self.next())
    }
}

impl<R: RecordReader + ?Sized> RecordReader for &mut R {
    fn read_next(&mut self) -> Result<Option<JournalRecord>, StoreError> {
        (**self).read_next()
    }
}
