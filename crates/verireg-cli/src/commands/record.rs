//! Record command implementation.

use verireg_canonical::{Fingerprint, Identity};
use verireg_core::{RegistryConfig, VerificationType};

use super::{open_registry, CommandResult};
use crate::output;

pub fn run(
    journal: String,
    attester: Identity,
    fingerprint: Fingerprint,
    verified: bool,
    verification_type: VerificationType,
    details: String,
    config: &RegistryConfig,
) -> CommandResult {
    let registry = open_registry(&journal, config)?;
    registry.store_verification_result(&attester, fingerprint, verified, verification_type, details)?;

    let record = registry.verification_status(&fingerprint)?;
    output::print_record(&record);
    Ok(())
}
