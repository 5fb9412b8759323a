//! Enumeration commands: count, hash-at, list.

use verireg_core::RegistryConfig;

use super::{open_registry, CommandResult};
use crate::output;

pub fn count(journal: String, config: &RegistryConfig) -> CommandResult {
    let registry = open_registry(&journal, config)?;
    println!("{}", registry.verification_count());
    Ok(())
}

pub fn hash_at(journal: String, index: usize, config: &RegistryConfig) -> CommandResult {
    let registry = open_registry(&journal, config)?;
    println!("{}", registry.verification_hash_at(index)?);
    Ok(())
}

pub fn run(
    journal: String,
    offset: usize,
    limit: Option<usize>,
    json: bool,
    config: &RegistryConfig,
) -> CommandResult {
    let registry = open_registry(&journal, config)?;
    let limit = limit.unwrap_or(config.max_page_size);
    let page = registry.fingerprints(offset, limit);

    if !json {
        output::print_record_header();
    }
    for (i, fingerprint) in page.iter().enumerate() {
        let record = registry.verification_status(fingerprint)?;
        if json {
            println!("{}", serde_json::to_string(&record)?);
        } else {
            println!("{}", output::format_record_row(offset + i, &record));
        }
    }
    Ok(())
}
