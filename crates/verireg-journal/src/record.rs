use serde::{Deserialize, Serialize};
use verireg_canonical::{Canonicalizer, EntryDigest};
use verireg_core::LedgerEntry;

use crate::errors::JournalError;

/// Domain separator prefixed to every record digest.
pub const ENTRY_DOMAIN: &[u8] = b"verireg:entry:v1\0";

/// One ledger entry as stored in a journal frame.
///
/// `digest` covers `seq`, `prev` and `entry`; `prev` is the digest of the
/// record before it, so editing or dropping any record breaks every digest
/// after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Position in the journal, starting at 0.
    pub seq: u64,
    /// Digest of the previous record; absent for seq 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<EntryDigest>,
    /// Digest of this record.
    pub digest: EntryDigest,
    /// The ledger entry.
    pub entry: LedgerEntry,
}

#[derive(Serialize)]
struct DigestInput<'a> {
    seq: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    prev: Option<&'a EntryDigest>,
    entry: &'a LedgerEntry,
}

/// Computes the digest a record at `seq` with predecessor `prev` must carry.
pub fn compute_digest(
    seq: u64,
    prev: Option<&EntryDigest>,
    entry: &LedgerEntry,
    canonicalizer: &Canonicalizer,
) -> Result<EntryDigest, JournalError> {
    let bytes = canonicalizer.canonicalize_serialize(&DigestInput { seq, prev, entry })?;
    Ok(EntryDigest::with_domain(ENTRY_DOMAIN, &bytes))
}

/// Tip of a journal chain: where the next record goes and what it links to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainHead {
    next_seq: u64,
    last: Option<EntryDigest>,
}

impl ChainHead {
    /// Head of an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number the next record will carry.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Digest of the last record, if any.
    pub fn last_digest(&self) -> Option<&EntryDigest> {
        self.last.as_ref()
    }

    /// Builds the record that would extend the chain. Does not advance.
    pub fn seal(
        &self,
        entry: LedgerEntry,
        canonicalizer: &Canonicalizer,
    ) -> Result<JournalRecord, JournalError> {
        let digest = compute_digest(self.next_seq, self.last.as_ref(), &entry, canonicalizer)?;
        Ok(JournalRecord {
            seq: self.next_seq,
            prev: self.last,
            digest,
            entry,
        })
    }

    /// Checks that `record` is the correct next link.
    pub fn check(
        &self,
        record: &JournalRecord,
        canonicalizer: &Canonicalizer,
    ) -> Result<(), JournalError> {
        let broken = |reason: String| JournalError::ChainBroken {
            seq: record.seq,
            reason,
        };
        if record.seq != self.next_seq {
            return Err(broken(format!("expected seq {}", self.next_seq)));
        }
        if record.prev != self.last {
            return Err(broken("prev does not match previous digest".to_string()));
        }
        let expected = compute_digest(record.seq, record.prev.as_ref(), &record.entry, canonicalizer)?;
        if expected != record.digest {
            return Err(broken(format!(
                "digest mismatch: stored {}, computed {}",
                record.digest, expected
            )));
        }
        Ok(())
    }

    /// Moves the head past `record`. Call only after `check` or `seal`.
    pub fn advance(&mut self, record: &JournalRecord) {
        self.next_seq = record.seq + 1;
        self.last = Some(record.digest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verireg_canonical::Identity;

    fn genesis() -> LedgerEntry {
        LedgerEntry::Genesis {
            owner: Identity::parse("human:owner").unwrap(),
        }
    }

    #[test]
    fn first_record_has_no_prev() {
        let canonicalizer = Canonicalizer::new();
        let record = ChainHead::new().seal(genesis(), &canonicalizer).unwrap();
        assert_eq!(record.seq, 0);
        assert!(record.prev.is_none());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("prev").is_none());
    }

    #[test]
    fn digest_depends_on_position() {
        let canonicalizer = Canonicalizer::new();
        let a = compute_digest(0, None, &genesis(), &canonicalizer).unwrap();
        let b = compute_digest(1, None, &genesis(), &canonicalizer).unwrap();
        let c = compute_digest(1, Some(&a), &genesis(), &canonicalizer).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
    }

    #[test]
    fn head_links_records() {
        let canonicalizer = Canonicalizer::new();
        let mut head = ChainHead::new();
        let first = head.seal(genesis(), &canonicalizer).unwrap();
        head.check(&first, &canonicalizer).unwrap();
        head.advance(&first);

        let second = head.seal(genesis(), &canonicalizer).unwrap();
        assert_eq!(second.seq, 1);
        assert_eq!(second.prev, Some(first.digest));

        // Replaying the first record again is out of order.
        assert!(matches!(
            head.check(&first, &canonicalizer),
            Err(JournalError::ChainBroken { seq: 0, .. })
        ));
    }
}
