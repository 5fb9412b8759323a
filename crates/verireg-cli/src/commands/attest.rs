//! Attest command: the reference oracle answers a verification request.

use std::sync::mpsc;
use std::sync::Arc;

use serde_json::Value;
use verireg_canonical::{Canonicalizer, Identity};
use verireg_core::{
    Attestation, ChannelSink, ClaimBook, ReferenceOracle, ReferenceRecords, RegistryConfig,
    VerificationType,
};

use super::{open_registry_with_sink, CommandResult};
use crate::output;

fn read_json(path: &str, what: &str) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {} {}: {}", what, path, e).into())
}

/// Files the claim, requests its verification as the oracle, and lets the
/// oracle answer the queued request.
pub fn run(
    journal: String,
    claim_path: String,
    verification_type: VerificationType,
    references: Option<String>,
    oracle: Identity,
    json: bool,
    config: &RegistryConfig,
) -> CommandResult {
    let claim: Value = serde_json::from_str(&read_json(&claim_path, "claim")?)
        .map_err(|e| format!("Invalid claim JSON: {}", e))?;
    let references = match references {
        Some(path) => ReferenceRecords::from_json_str(&read_json(&path, "references")?)?,
        None => ReferenceRecords::demo(),
    };

    let (tx, rx) = mpsc::channel();
    let registry = open_registry_with_sink(&journal, config, Arc::new(ChannelSink::new(tx)))?;
    let mut claims = ClaimBook::new();
    let fingerprint = claims.insert(claim, &Canonicalizer::new())?;
    registry.request_verification(&oracle, fingerprint, verification_type);

    let oracle = ReferenceOracle::new(oracle, references);
    for attestation in oracle.drain(&registry, &rx, &claims)? {
        if json {
            output::print_json(&attestation)?;
            continue;
        }
        match attestation {
            Attestation::Stored { fingerprint, .. } => {
                output::print_record(&registry.verification_status(&fingerprint)?)
            }
            Attestation::AlreadyRecorded { fingerprint } => {
                println!("Already recorded: {}", fingerprint)
            }
        }
    }
    Ok(())
}
