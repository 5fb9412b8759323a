//! Digest and linkage checks for journal records.

use crate::errors::JournalError;
use crate::record::{compute_digest, ChainHead, JournalRecord};
use verireg_canonical::Canonicalizer;

/// Checks a single record's digest against its own contents.
///
/// Linkage to neighbours is not checked; use [`verify_chain`] for that.
pub fn verify_record(
    record: &JournalRecord,
    canonicalizer: &Canonicalizer,
) -> Result<bool, JournalError> {
    let computed = compute_digest(record.seq, record.prev.as_ref(), &record.entry, canonicalizer)?;
    Ok(computed == record.digest)
}

/// Walks records from seq 0 and checks digests, sequence numbers and `prev`
/// links. Returns the head after the last record.
pub fn verify_chain<'a, I>(records: I, canonicalizer: &Canonicalizer) -> Result<ChainHead, JournalError>
where
    I: IntoIterator<Item = &'a JournalRecord>,
{
    let mut head = ChainHead::new();
    for record in records {
        head.check(record, canonicalizer)?;
        head.advance(record);
    }
    Ok(head)
}
