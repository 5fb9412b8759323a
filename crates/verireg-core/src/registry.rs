//! The registry service: locking, persistence and event delivery around
//! [`RegistryState`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};
use verireg_canonical::{Fingerprint, Identity};

use crate::config::RegistryConfig;
use crate::errors::RegistryError;
use crate::events::{EventSink, NullSink, RegistryEvent};
use crate::ledger::{Ledger, LedgerEntry, MemoryLedger};
use crate::record::{RequestId, VerificationRecord, VerificationType};
use crate::state::RegistryState;

/// Oracle-attested verification registry.
///
/// Mutations take the ledger mutex for their whole validate, persist, apply
/// sequence, so they form one total order. State sits behind a single
/// `RwLock`; readers see the record map and enumeration order together.
/// Mutation events are delivered in that same order, after the state lock is
/// released but while the ledger mutex is still held. A sink must therefore
/// not call back into a mutating method of the same registry.
///
/// # Example
///
/// ```rust
/// use verireg_core::{Fingerprint, Identity, Registry, VerificationType};
///
/// let owner = Identity::parse("human:owner")?;
/// let registry = Registry::in_memory(owner.clone())?;
///
/// let fp = Fingerprint::of_text("Test data");
/// registry.store_verification_result(&owner, fp, true, VerificationType::Gpa, "details")?;
/// assert!(registry.verification_exists(&fp));
/// assert_eq!(registry.verification_hash_at(0)?, fp);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Registry<L: Ledger> {
    config: RegistryConfig,
    state: RwLock<RegistryState>,
    ledger: Mutex<L>,
    sink: Arc<dyn EventSink>,
    next_request: AtomicU64,
}

impl Registry<MemoryLedger> {
    /// Volatile registry with default config and no event consumer.
    pub fn in_memory(owner: Identity) -> Result<Self, RegistryError> {
        Self::create(
            owner,
            MemoryLedger::new(),
            RegistryConfig::default(),
            Arc::new(NullSink),
        )
    }
}

impl<L: Ledger> Registry<L> {
    /// Creates a new registry owned by `owner` on an empty ledger.
    ///
    /// # Errors
    ///
    /// `Corrupt` if the ledger already holds entries, `Config` for invalid
    /// limits, `Ledger` if the genesis entry cannot be persisted.
    pub fn create(
        owner: Identity,
        mut ledger: L,
        config: RegistryConfig,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, RegistryError> {
        config.validate()?;
        if !ledger.replay()?.is_empty() {
            return Err(RegistryError::Corrupt(
                "ledger already initialized; open it instead".to_string(),
            ));
        }
        ledger.append(&LedgerEntry::Genesis {
            owner: owner.clone(),
        })?;
        info!(%owner, "registry created");
        Ok(Self::from_parts(RegistryState::genesis(owner), ledger, config, sink))
    }

    /// Reopens a registry by replaying its ledger.
    pub fn open(
        mut ledger: L,
        config: RegistryConfig,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, RegistryError> {
        config.validate()?;
        let entries = ledger.replay()?;
        let state = RegistryState::from_entries(&entries)?;
        info!(
            owner = %state.owner(),
            entries = entries.len(),
            records = state.len(),
            "registry replayed"
        );
        Ok(Self::from_parts(state, ledger, config, sink))
    }

    fn from_parts(
        state: RegistryState,
        ledger: L,
        config: RegistryConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            state: RwLock::new(state),
            ledger: Mutex::new(ledger),
            sink,
            next_request: AtomicU64::new(1),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Consumes the registry and returns its ledger.
    pub fn into_ledger(self) -> L {
        self.ledger
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> RegistryState {
        self.read_state().clone()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_ledger(&self) -> MutexGuard<'_, L> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one mutation under the single-writer lock.
    ///
    /// `plan` sees the current state and returns the entry to persist, or
    /// `None` when the call is a no-op. Nothing changes unless the append
    /// succeeds. The event is emitted before the ledger guard drops so that
    /// sinks observe commit order.
    fn mutate<F>(&self, plan: F) -> Result<Option<RegistryEvent>, RegistryError>
    where
        F: FnOnce(&RegistryState) -> Result<Option<LedgerEntry>, RegistryError>,
    {
        let mut ledger = self.lock_ledger();
        let entry = {
            let state = self.read_state();
            plan(&state)?
        };
        let Some(entry) = entry else {
            return Ok(None);
        };
        ledger.append(&entry)?;
        let event = self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(&entry)?;

        if let Some(event) = &event {
            self.sink.emit(event);
        }
        drop(ledger);
        Ok(event)
    }

    /// Signals that `fingerprint` should be verified. Anyone may call.
    ///
    /// Emits `VerificationRequested`; no record or registry state is touched.
    pub fn request_verification(
        &self,
        requester: &Identity,
        fingerprint: Fingerprint,
        verification_type: VerificationType,
    ) -> RequestId {
        let request_id = RequestId(self.next_request.fetch_add(1, Ordering::Relaxed));
        debug!(%request_id, %requester, %fingerprint, "verification requested");
        self.sink.emit(&RegistryEvent::VerificationRequested {
            request_id,
            requester: requester.clone(),
            fingerprint,
            verification_type,
        });
        request_id
    }

    /// Adds `oracle` to the oracle set. Owner only; idempotent.
    pub fn authorize_oracle(&self, caller: &Identity, oracle: &Identity) -> Result<(), RegistryError> {
        let event = self.mutate(|state| {
            if let Err(e) = state.require_owner(caller) {
                warn!(%caller, %oracle, "authorize_oracle denied");
                return Err(e);
            }
            if state.is_oracle(oracle) {
                return Ok(None);
            }
            Ok(Some(LedgerEntry::OracleAuthorized {
                by: caller.clone(),
                oracle: oracle.clone(),
            }))
        })?;
        if event.is_some() {
            info!(%oracle, "oracle authorized");
        }
        Ok(())
    }

    /// Removes `oracle` from the oracle set. Owner only; idempotent.
    ///
    /// Records the oracle already wrote are untouched.
    pub fn deauthorize_oracle(
        &self,
        caller: &Identity,
        oracle: &Identity,
    ) -> Result<(), RegistryError> {
        let event = self.mutate(|state| {
            if let Err(e) = state.require_owner(caller) {
                warn!(%caller, %oracle, "deauthorize_oracle denied");
                return Err(e);
            }
            if !state.is_oracle(oracle) {
                return Ok(None);
            }
            Ok(Some(LedgerEntry::OracleDeauthorized {
                by: caller.clone(),
                oracle: oracle.clone(),
            }))
        })?;
        if event.is_some() {
            info!(%oracle, "oracle deauthorized");
        }
        Ok(())
    }

    /// Stores a verification result. Current oracles only.
    ///
    /// The first write for a fingerprint creates the record and appends it
    /// to the enumeration order. Later writes follow the configured
    /// [`OverwritePolicy`](crate::OverwritePolicy) and never re-append.
    ///
    /// Checks run in order: caller is an oracle, `details` fits
    /// `max_details_len`, overwrite policy.
    pub fn store_verification_result(
        &self,
        caller: &Identity,
        fingerprint: Fingerprint,
        is_verified: bool,
        verification_type: VerificationType,
        details: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let details = details.into();
        let policy = self.config.overwrite_policy;
        let max_details_len = self.config.max_details_len;
        self.mutate(|state| {
            if let Err(e) = state.require_oracle(caller) {
                warn!(%caller, %fingerprint, "store_verification_result denied");
                return Err(e);
            }
            if details.len() > max_details_len {
                return Err(RegistryError::InvalidArgument(format!(
                    "details is {} bytes, limit is {}",
                    details.len(),
                    max_details_len
                )));
            }
            state.check_overwrite(policy, &fingerprint, caller)?;
            Ok(Some(LedgerEntry::ResultStored {
                attester: caller.clone(),
                fingerprint,
                is_verified,
                verification_type,
                details,
            }))
        })?;
        info!(%caller, %fingerprint, is_verified, %verification_type, "verification result stored");
        Ok(())
    }

    /// Record for `fingerprint`, or `NotFound`.
    pub fn verification_status(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<VerificationRecord, RegistryError> {
        self.read_state()
            .record(fingerprint)
            .cloned()
            .ok_or(RegistryError::NotFound(*fingerprint))
    }

    /// Whether a record exists for `fingerprint`.
    pub fn verification_exists(&self, fingerprint: &Fingerprint) -> bool {
        self.read_state().record(fingerprint).is_some()
    }

    /// Number of distinct recorded fingerprints.
    pub fn verification_count(&self) -> usize {
        self.read_state().len()
    }

    /// Fingerprint at a creation-order index; stable across overwrites.
    pub fn verification_hash_at(&self, index: usize) -> Result<Fingerprint, RegistryError> {
        let state = self.read_state();
        state
            .fingerprint_at(index)
            .copied()
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                count: state.len(),
            })
    }

    /// Page of the creation order. `limit` is clamped to `max_page_size`.
    pub fn fingerprints(&self, offset: usize, limit: usize) -> Vec<Fingerprint> {
        let limit = limit.min(self.config.max_page_size);
        self.read_state().page(offset, limit).to_vec()
    }

    /// Registry owner.
    pub fn owner(&self) -> Identity {
        self.read_state().owner().clone()
    }

    /// Whether `identity` is currently an oracle.
    pub fn is_oracle(&self, identity: &Identity) -> bool {
        self.read_state().is_oracle(identity)
    }

    /// Current oracles, sorted.
    pub fn oracles(&self) -> Vec<Identity> {
        self.read_state().oracles().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LedgerError;

    struct FailingLedger {
        inner: MemoryLedger,
        fail: bool,
    }

    impl Ledger for FailingLedger {
        fn replay(&mut self) -> Result<Vec<LedgerEntry>, LedgerError> {
            self.inner.replay()
        }

        fn append(&mut self, entry: &LedgerEntry) -> Result<(), LedgerError> {
            if self.fail {
                return Err(LedgerError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.append(entry)
        }
    }

    #[test]
    fn failed_append_leaves_state_and_events_untouched() {
        let owner = Identity::parse("human:owner").unwrap();
        let log = crate::EventLog::new();
        let ledger = FailingLedger {
            inner: MemoryLedger::new(),
            fail: false,
        };
        let registry =
            Registry::create(owner.clone(), ledger, RegistryConfig::default(), Arc::new(log.clone()))
                .unwrap();
        registry.ledger.lock().unwrap().fail = true;

        let fp = Fingerprint::of_text("x");
        let err = registry
            .store_verification_result(&owner, fp, true, VerificationType::Gpa, "")
            .unwrap_err();
        assert!(matches!(err, RegistryError::Ledger(_)));
        assert!(!registry.verification_exists(&fp));
        assert_eq!(registry.verification_count(), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn create_refuses_non_empty_ledger() {
        let owner = Identity::parse("human:owner").unwrap();
        let ledger = Registry::in_memory(owner.clone()).unwrap().into_ledger();
        assert!(matches!(
            Registry::create(owner, ledger, RegistryConfig::default(), Arc::new(NullSink)),
            Err(RegistryError::Corrupt(_))
        ));
    }

    #[test]
    fn request_ids_increase() {
        let owner = Identity::parse("human:owner").unwrap();
        let registry = Registry::in_memory(owner.clone()).unwrap();
        let fp = Fingerprint::of_text("x");
        let a = registry.request_verification(&owner, fp, VerificationType::Gpa);
        let b = registry.request_verification(&owner, fp, VerificationType::Gpa);
        assert!(b > a);
    }
}
