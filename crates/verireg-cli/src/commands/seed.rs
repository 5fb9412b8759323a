//! Seed command: the owner attests the demonstration claims against the
//! built-in reference records.

use verireg_core::{Attestation, ReferenceOracle, ReferenceRecords, RegistryConfig};

use super::{open_registry, CommandResult};

/// Attests every demo claim as the registry owner. Fingerprints that already
/// have a record are left alone, so seeding twice is harmless.
pub fn run(journal: String, config: &RegistryConfig) -> CommandResult {
    let registry = open_registry(&journal, config)?;
    let references = ReferenceRecords::demo();
    let claims = references.claims();
    let oracle = ReferenceOracle::new(registry.owner(), references);

    let mut added = 0;
    for (claim, verification_type) in &claims {
        match oracle.attest(&registry, claim, *verification_type)? {
            Attestation::Stored {
                fingerprint,
                is_verified,
                ..
            } => {
                let verdict = if is_verified { "verified" } else { "rejected" };
                println!("added {} {} ({})", verification_type, fingerprint, verdict);
                added += 1;
            }
            Attestation::AlreadyRecorded { fingerprint } => {
                println!("skip  {} {}", verification_type, fingerprint);
            }
        }
    }
    println!(
        "Added {} verifications; registry now holds {}",
        added,
        registry.verification_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use verireg_canonical::{Canonicalizer, Fingerprint};
    use verireg_core::{ReferenceRecords, VerificationType};

    #[test]
    fn demo_claims_are_distinct() {
        let canonicalizer = Canonicalizer::new();
        let mut fingerprints: Vec<Fingerprint> = ReferenceRecords::demo()
            .claims()
            .iter()
            .map(|(claim, _)| Fingerprint::of_json(claim, &canonicalizer).unwrap())
            .collect();
        assert_eq!(fingerprints.len(), 6);
        fingerprints.sort();
        fingerprints.dedup();
        assert_eq!(fingerprints.len(), 6);
    }

    #[test]
    fn details_read_naturally() {
        let references = ReferenceRecords::demo();
        let (claim, verification_type) = &references.claims()[0];
        assert_eq!(*verification_type, VerificationType::Gpa);
        assert_eq!(
            references.check(claim, *verification_type).unwrap().details,
            "Verified Kalana De Alwis's GPA of 3.73 at NSBM Green University"
        );
    }
}
