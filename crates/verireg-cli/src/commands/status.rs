//! Status and exists commands.

use verireg_canonical::Fingerprint;
use verireg_core::RegistryConfig;

use super::{open_registry, CommandResult};
use crate::output;

pub fn run(journal: String, fingerprint: Fingerprint, json: bool, config: &RegistryConfig) -> CommandResult {
    let registry = open_registry(&journal, config)?;
    let record = registry.verification_status(&fingerprint)?;
    if json {
        output::print_json(&record)?;
    } else {
        output::print_record(&record);
    }
    Ok(())
}

/// Prints `true`/`false` and returns it; `main` turns `false` into exit
/// status 1 so scripts can branch on it.
pub fn exists(
    journal: String,
    fingerprint: Fingerprint,
    config: &RegistryConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let registry = open_registry(&journal, config)?;
    let found = registry.verification_exists(&fingerprint);
    println!("{}", found);
    Ok(found)
}
