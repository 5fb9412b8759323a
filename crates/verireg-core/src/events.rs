use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use verireg_canonical::{Fingerprint, Identity};

use crate::record::{RequestId, VerificationType};

/// Signals emitted by the registry for off-registry consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    /// A requester asked for a fingerprint to be verified.
    VerificationRequested {
        /// Correlation number returned to the requester.
        request_id: RequestId,
        /// Who asked.
        requester: Identity,
        /// Fingerprint to verify.
        fingerprint: Fingerprint,
        /// Kind of claim.
        verification_type: VerificationType,
    },
    /// An oracle stored a result.
    VerificationCompleted {
        /// Fingerprint the result was stored under.
        fingerprint: Fingerprint,
        /// Outcome.
        is_verified: bool,
        /// Kind of claim.
        verification_type: VerificationType,
        /// Oracle that wrote the result.
        attester: Identity,
        /// Record revision after the write.
        revision: u32,
    },
    /// The owner added an oracle.
    OracleAuthorized {
        /// Newly authorized oracle.
        oracle: Identity,
    },
    /// The owner removed an oracle.
    OracleDeauthorized {
        /// Removed oracle.
        oracle: Identity,
    },
}

impl RegistryEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::VerificationRequested { .. } => "VerificationRequested",
            RegistryEvent::VerificationCompleted { .. } => "VerificationCompleted",
            RegistryEvent::OracleAuthorized { .. } => "OracleAuthorized",
            RegistryEvent::OracleDeauthorized { .. } => "OracleDeauthorized",
        }
    }
}

/// Receives registry events after the state change they describe is visible.
pub trait EventSink: Send + Sync {
    /// Delivers one event. Must not block for long.
    fn emit(&self, event: &RegistryEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &RegistryEvent) {}
}

/// Logs every event through `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &RegistryEvent) {
        match event {
            RegistryEvent::VerificationRequested {
                request_id,
                requester,
                fingerprint,
                verification_type,
            } => tracing::info!(
                %request_id,
                %requester,
                %fingerprint,
                %verification_type,
                "VerificationRequested"
            ),
            RegistryEvent::VerificationCompleted {
                fingerprint,
                is_verified,
                verification_type,
                attester,
                revision,
            } => tracing::info!(
                %fingerprint,
                is_verified,
                %verification_type,
                %attester,
                revision,
                "VerificationCompleted"
            ),
            RegistryEvent::OracleAuthorized { oracle } => {
                tracing::info!(%oracle, "OracleAuthorized")
            }
            RegistryEvent::OracleDeauthorized { oracle } => {
                tracing::info!(%oracle, "OracleDeauthorized")
            }
        }
    }
}

/// In-memory event collector. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Arc<Mutex<Vec<RegistryEvent>>>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out every event seen so far.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns every event seen so far.
    pub fn drain(&self) -> Vec<RegistryEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of events seen so far.
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when no events have been seen.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &RegistryEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Forwards events to an `mpsc` receiver, e.g. an oracle worker thread.
///
/// A disconnected receiver is logged and otherwise ignored; the registry
/// operation that produced the event has already succeeded.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Mutex<Sender<RegistryEvent>>,
}

impl ChannelSink {
    /// Wraps a sender.
    pub fn new(sender: Sender<RegistryEvent>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &RegistryEvent) {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        if sender.send(event.clone()).is_err() {
            tracing::warn!(event = event.name(), "event receiver disconnected; dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn oracle_event() -> RegistryEvent {
        RegistryEvent::OracleAuthorized {
            oracle: Identity::parse("oracle:registrar").unwrap(),
        }
    }

    #[test]
    fn event_log_clones_share_buffer() {
        let log = EventLog::new();
        let handle = log.clone();
        handle.emit(&oracle_event());
        assert_eq!(log.len(), 1);
        assert_eq!(log.drain().len(), 1);
        assert!(handle.is_empty());
    }

    #[test]
    fn channel_sink_forwards_and_survives_disconnect() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        sink.emit(&oracle_event());
        assert_eq!(rx.recv().unwrap(), oracle_event());
        drop(rx);
        sink.emit(&oracle_event());
    }

    #[test]
    fn events_serialize_with_tag() {
        let value = serde_json::to_value(oracle_event()).unwrap();
        assert_eq!(value["event"], "OracleAuthorized");
        assert_eq!(value["oracle"], "oracle:registrar");
    }
}
