//! Init command implementation.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;
use verireg_canonical::Identity;
use verireg_core::{Registry, RegistryConfig, TracingSink};
use verireg_store::{JournalLedger, LedgerOptions};

use super::CommandResult;
use crate::path;

pub fn run(journal: String, owner: Identity, config: &RegistryConfig) -> CommandResult {
    let journal_path = path::validate_journal_path(&journal, false)
        .map_err(|e| format!("Invalid journal path: {}", e))?;
    create(&journal_path, owner.clone(), config)?;

    println!(
        "Created registry {} owned by {}",
        path::sanitize_path_for_error(&journal_path),
        owner
    );
    Ok(())
}

/// Creates the journal and writes genesis. A journal file left without a
/// genesis entry is removed so `init` can be retried.
fn create(journal_path: &Path, owner: Identity, config: &RegistryConfig) -> CommandResult {
    let ledger = JournalLedger::open(journal_path, LedgerOptions::default())?;
    if let Err(e) = Registry::create(owner, ledger, config.clone(), Arc::new(TracingSink)) {
        if let Err(remove) = std::fs::remove_file(journal_path) {
            warn!(
                path = %path::sanitize_path_for_error(journal_path),
                error = %remove,
                "could not remove incomplete journal"
            );
        }
        return Err(e.into());
    }
    Ok(())
}
