//! Subcommand implementations.
//!
//! Every command that touches a registry goes through [`open_registry`], so
//! each invocation replays and verifies the whole journal before acting.

pub mod attest;
pub mod fingerprint;
pub mod history;
pub mod init;
pub mod list;
pub mod membership;
pub mod record;
pub mod request;
pub mod seed;
pub mod status;
pub mod verify;

use std::sync::Arc;

use verireg_core::{EventSink, Registry, RegistryConfig, TracingSink};
use verireg_store::{JournalLedger, LedgerOptions};

use crate::path;

/// Result type shared by all commands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Opens an existing registry journal, logging events through `tracing`.
pub fn open_registry(
    journal: &str,
    config: &RegistryConfig,
) -> Result<Registry<JournalLedger>, Box<dyn std::error::Error>> {
    open_registry_with_sink(journal, config, Arc::new(TracingSink))
}

/// Opens an existing registry journal with a custom event sink.
pub fn open_registry_with_sink(
    journal: &str,
    config: &RegistryConfig,
    sink: Arc<dyn EventSink>,
) -> Result<Registry<JournalLedger>, Box<dyn std::error::Error>> {
    let journal_path = path::validate_journal_path(journal, true)
        .map_err(|e| format!("Invalid journal path: {}", e))?;
    let ledger = JournalLedger::open(&journal_path, LedgerOptions::default()).map_err(|e| {
        format!(
            "Failed to open journal {}: {}",
            path::sanitize_path_for_error(&journal_path),
            e
        )
    })?;
    Ok(Registry::open(ledger, config.clone(), sink)?)
}
