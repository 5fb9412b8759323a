//! History views computed by scanning the journal.
//!
//! The registry keeps only the latest record per fingerprint and the
//! current oracle set; these views recover everything that came before.

use crate::error::StoreError;
use crate::filter::{FilteredReader, FingerprintFilter};
use crate::traits::RecordReader;
use serde::Serialize;
use verireg_canonical::{Fingerprint, Identity};
use verireg_core::{LedgerEntry, VerificationType};

/// One stored result as it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attestation {
    /// Journal sequence number of the write.
    pub seq: u64,
    /// Oracle that wrote it.
    pub attester: Identity,
    /// Outcome.
    pub is_verified: bool,
    /// Kind of claim.
    pub verification_type: VerificationType,
    /// Free-text explanation.
    pub details: String,
}

/// Every result stored for `fingerprint`, oldest first.
///
/// The last element matches the live record; earlier ones were overwritten.
pub fn attestation_history<R: RecordReader>(
    reader: R,
    fingerprint: &Fingerprint,
) -> Result<Vec<Attestation>, StoreError> {
    let mut reader = FilteredReader::new(
        reader,
        FingerprintFilter {
            fingerprint: *fingerprint,
        },
    );
    let mut history = Vec::new();
    while let Some(record) = reader.read_next()? {
        if let LedgerEntry::ResultStored {
            attester,
            is_verified,
            verification_type,
            details,
            ..
        } = record.entry
        {
            history.push(Attestation {
                seq: record.seq,
                attester,
                is_verified,
                verification_type,
                details,
            });
        }
    }
    Ok(history)
}

/// A change to one identity's oracle membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipChange {
    /// Journal sequence number of the change.
    pub seq: u64,
    /// Who made the change.
    pub by: Identity,
    /// True for a grant, false for a revocation.
    pub granted: bool,
}

/// Grants and revocations of oracle rights for `identity`, oldest first.
///
/// The registry owner's implicit grant at genesis is included.
pub fn oracle_timeline<R: RecordReader>(
    mut reader: R,
    identity: &Identity,
) -> Result<Vec<MembershipChange>, StoreError> {
    let mut timeline = Vec::new();
    while let Some(record) = reader.read_next()? {
        let change = match record.entry {
            LedgerEntry::Genesis { owner } if owner == *identity => Some((owner, true)),
            LedgerEntry::OracleAuthorized { by, oracle } if oracle == *identity => Some((by, true)),
            LedgerEntry::OracleDeauthorized { by, oracle } if oracle == *identity => {
                Some((by, false))
            }
            _ => None,
        };
        if let Some((by, granted)) = change {
            timeline.push(MembershipChange {
                seq: record.seq,
                by,
                granted,
            });
        }
    }
    Ok(timeline)
}
