//! History command implementation.

use verireg_canonical::{Fingerprint, Identity};
use verireg_core::RegistryConfig;
use verireg_store::{attestation_history, oracle_timeline};

use super::{open_registry, CommandResult};
use crate::output;

/// Shows every attestation ever stored for a fingerprint.
pub fn run(journal: String, fingerprint: Fingerprint, json: bool, config: &RegistryConfig) -> CommandResult {
    let ledger = open_registry(&journal, config)?.into_ledger();
    let history = attestation_history(ledger.reader()?, &fingerprint)?;
    if history.is_empty() {
        return Err(format!("no verification record found for {}", fingerprint).into());
    }

    if json {
        output::print_json(&history)?;
        return Ok(());
    }
    output::print_history_header();
    for attestation in &history {
        println!("{}", output::format_history_row(attestation));
    }
    Ok(())
}

/// Shows when an identity gained and lost oracle rights.
pub fn oracle(journal: String, identity: Identity, json: bool, config: &RegistryConfig) -> CommandResult {
    let ledger = open_registry(&journal, config)?.into_ledger();
    let timeline = oracle_timeline(ledger.reader()?, &identity)?;

    if json {
        output::print_json(&timeline)?;
        return Ok(());
    }
    for change in &timeline {
        let verb = if change.granted { "granted" } else { "revoked" };
        println!("{:<6} {} by {}", change.seq, verb, change.by);
    }
    Ok(())
}
