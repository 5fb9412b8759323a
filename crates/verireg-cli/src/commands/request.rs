//! Request command implementation.

use std::sync::Arc;

use verireg_canonical::{Fingerprint, Identity};
use verireg_core::{EventLog, EventSink, RegistryConfig, RegistryEvent, TracingSink, VerificationType};

use super::{open_registry_with_sink, CommandResult};
use crate::output;

/// Emits a verification request and prints the resulting event.
///
/// Requests are not journaled; the printed event is the only trace, meant to
/// be piped to whatever performs the off-registry check.
pub fn run(
    journal: String,
    requester: Identity,
    fingerprint: Fingerprint,
    verification_type: VerificationType,
    config: &RegistryConfig,
) -> CommandResult {
    let log = EventLog::new();
    let registry = open_registry_with_sink(&journal, config, Arc::new(Tee(log.clone())))?;
    registry.request_verification(&requester, fingerprint, verification_type);

    for event in log.drain() {
        output::print_json(&event)?;
    }
    Ok(())
}

/// Keeps the usual tracing output while collecting events for stdout.
struct Tee(EventLog);

impl EventSink for Tee {
    fn emit(&self, event: &RegistryEvent) {
        TracingSink.emit(event);
        self.0.emit(event);
    }
}
