use std::collections::{BTreeSet, HashMap};
use verireg_canonical::{Fingerprint, Identity};

use crate::config::OverwritePolicy;
use crate::errors::{RegistryError, Role};
use crate::events::RegistryEvent;
use crate::ledger::LedgerEntry;
use crate::record::VerificationRecord;

/// Owner, oracle set, records and enumeration order.
///
/// Pure and single-threaded; [`Registry`](crate::Registry) adds locking,
/// persistence and event delivery on top. Records and order are only ever
/// changed together inside [`apply`](Self::apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryState {
    owner: Identity,
    oracles: BTreeSet<Identity>,
    records: HashMap<Fingerprint, VerificationRecord>,
    order: Vec<Fingerprint>,
}

impl RegistryState {
    /// Fresh state: `owner` is owner and the only oracle.
    pub fn genesis(owner: Identity) -> Self {
        let mut oracles = BTreeSet::new();
        oracles.insert(owner.clone());
        Self {
            owner,
            oracles,
            records: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Rebuilds state from a full ledger.
    ///
    /// The first entry must be the only `Genesis`, and every later entry must
    /// have been authorized under the state that preceded it.
    pub fn from_entries(entries: &[LedgerEntry]) -> Result<Self, RegistryError> {
        let (first, rest) = entries
            .split_first()
            .ok_or_else(|| RegistryError::Corrupt("ledger has no genesis entry".to_string()))?;
        let LedgerEntry::Genesis { owner } = first else {
            return Err(RegistryError::Corrupt(format!(
                "first entry is {}, expected genesis",
                first.kind()
            )));
        };

        let mut state = Self::genesis(owner.clone());
        for (offset, entry) in rest.iter().enumerate() {
            state.authorize(entry).map_err(|e| {
                RegistryError::Corrupt(format!("entry {} rejected on replay: {}", offset + 1, e))
            })?;
            state.apply(entry).map_err(|e| {
                RegistryError::Corrupt(format!("entry {} rejected on replay: {}", offset + 1, e))
            })?;
        }
        Ok(state)
    }

    /// Registry owner.
    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Whether `identity` is currently an oracle.
    pub fn is_oracle(&self, identity: &Identity) -> bool {
        self.oracles.contains(identity)
    }

    /// Current oracles in sorted order.
    pub fn oracles(&self) -> impl Iterator<Item = &Identity> {
        self.oracles.iter()
    }

    /// Record for a fingerprint.
    pub fn record(&self, fingerprint: &Fingerprint) -> Option<&VerificationRecord> {
        self.records.get(fingerprint)
    }

    /// Number of recorded fingerprints.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Fingerprint at a creation-order index.
    pub fn fingerprint_at(&self, index: usize) -> Option<&Fingerprint> {
        self.order.get(index)
    }

    /// Slice of the creation order; empty when `offset` is past the end.
    pub fn page(&self, offset: usize, limit: usize) -> &[Fingerprint] {
        let start = offset.min(self.order.len());
        let end = start.saturating_add(limit).min(self.order.len());
        &self.order[start..end]
    }

    /// Fails with `Unauthorized` unless `caller` is the owner.
    pub fn require_owner(&self, caller: &Identity) -> Result<(), RegistryError> {
        if *caller != self.owner {
            return Err(RegistryError::Unauthorized {
                caller: caller.clone(),
                required: Role::Owner,
            });
        }
        Ok(())
    }

    /// Fails with `Unauthorized` unless `caller` is a current oracle.
    pub fn require_oracle(&self, caller: &Identity) -> Result<(), RegistryError> {
        if !self.is_oracle(caller) {
            return Err(RegistryError::Unauthorized {
                caller: caller.clone(),
                required: Role::Oracle,
            });
        }
        Ok(())
    }

    /// Checks the overwrite policy for a write by `attester`.
    pub fn check_overwrite(
        &self,
        policy: OverwritePolicy,
        fingerprint: &Fingerprint,
        attester: &Identity,
    ) -> Result<(), RegistryError> {
        let Some(existing) = self.records.get(fingerprint) else {
            return Ok(());
        };
        let refused = match policy {
            OverwritePolicy::Overwrite => false,
            OverwritePolicy::SameAttesterOnly => existing.attester != *attester,
            OverwritePolicy::RejectOverwrite => true,
        };
        if refused {
            return Err(RegistryError::AlreadyAttested {
                fingerprint: *fingerprint,
                attester: existing.attester.clone(),
            });
        }
        Ok(())
    }

    /// Role check for a ledger entry against the current state.
    pub fn authorize(&self, entry: &LedgerEntry) -> Result<(), RegistryError> {
        match entry {
            LedgerEntry::Genesis { .. } => Err(RegistryError::Corrupt(
                "genesis may only appear once, first".to_string(),
            )),
            LedgerEntry::OracleAuthorized { by, .. } | LedgerEntry::OracleDeauthorized { by, .. } => {
                self.require_owner(by)
            }
            LedgerEntry::ResultStored { attester, .. } => self.require_oracle(attester),
        }
    }

    /// Applies an already-authorized entry and returns the event it produces.
    ///
    /// Membership entries that change nothing return `None`.
    pub fn apply(&mut self, entry: &LedgerEntry) -> Result<Option<RegistryEvent>, RegistryError> {
        match entry {
            LedgerEntry::Genesis { .. } => Err(RegistryError::Corrupt(
                "genesis may only appear once, first".to_string(),
            )),
            LedgerEntry::OracleAuthorized { oracle, .. } => {
                Ok(self
                    .oracles
                    .insert(oracle.clone())
                    .then(|| RegistryEvent::OracleAuthorized {
                        oracle: oracle.clone(),
                    }))
            }
            LedgerEntry::OracleDeauthorized { oracle, .. } => {
                Ok(self
                    .oracles
                    .remove(oracle)
                    .then(|| RegistryEvent::OracleDeauthorized {
                        oracle: oracle.clone(),
                    }))
            }
            LedgerEntry::ResultStored {
                attester,
                fingerprint,
                is_verified,
                verification_type,
                details,
            } => {
                let revision = match self.records.get_mut(fingerprint) {
                    Some(existing) => {
                        existing.is_verified = *is_verified;
                        existing.verification_type = *verification_type;
                        existing.attester = attester.clone();
                        existing.details = details.clone();
                        existing.revision = existing.revision.saturating_add(1);
                        existing.revision
                    }
                    None => {
                        self.records.insert(
                            *fingerprint,
                            VerificationRecord {
                                fingerprint: *fingerprint,
                                is_verified: *is_verified,
                                verification_type: *verification_type,
                                attester: attester.clone(),
                                details: details.clone(),
                                revision: 1,
                            },
                        );
                        self.order.push(*fingerprint);
                        1
                    }
                };
                Ok(Some(RegistryEvent::VerificationCompleted {
                    fingerprint: *fingerprint,
                    is_verified: *is_verified,
                    verification_type: *verification_type,
                    attester: attester.clone(),
                    revision,
                }))
            }
        }
    }
}
