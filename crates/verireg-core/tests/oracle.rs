use std::sync::mpsc;
use std::sync::Arc;

use serde_json::json;
use verireg_canonical::Canonicalizer;
use verireg_core::{
    Attestation, ChannelSink, ClaimBook, Fingerprint, Identity, MemoryLedger, OracleError,
    ReferenceOracle, ReferenceRecords, Registry, RegistryConfig, RegistryError, RegistryEvent,
    VerificationType,
};

fn id(s: &str) -> Identity {
    Identity::parse(s).unwrap()
}

fn owner() -> Identity {
    id("human:owner")
}

fn oracle_id() -> Identity {
    id("oracle:registrar")
}

fn setup() -> (Registry<MemoryLedger>, ReferenceOracle) {
    let registry = Registry::in_memory(owner()).unwrap();
    registry.authorize_oracle(&owner(), &oracle_id()).unwrap();
    (
        registry,
        ReferenceOracle::new(oracle_id(), ReferenceRecords::demo()),
    )
}

fn gpa_claim(gpa: f64) -> serde_json::Value {
    json!({"name": "Kalana De Alwis", "university": "NSBM Green University", "gpa": gpa})
}

#[test]
fn matching_claim_is_stored_as_verified() {
    let (registry, oracle) = setup();
    let claim = gpa_claim(3.73);
    let attestation = oracle.attest(&registry, &claim, VerificationType::Gpa).unwrap();

    let fp = Fingerprint::of_json(&claim, &Canonicalizer::new()).unwrap();
    match attestation {
        Attestation::Stored {
            fingerprint,
            is_verified,
            details,
            ..
        } => {
            assert_eq!(fingerprint, fp);
            assert!(is_verified);
            assert!(details.contains("Verified"));
        }
        other => panic!("expected Stored, got {:?}", other),
    }
    let record = registry.verification_status(&fp).unwrap();
    assert!(record.is_verified);
    assert_eq!(record.attester, oracle_id());
}

#[test]
fn mismatching_claim_is_stored_as_unverified() {
    let (registry, oracle) = setup();
    let claim = gpa_claim(3.5);
    oracle.attest(&registry, &claim, VerificationType::Gpa).unwrap();

    let fp = Fingerprint::of_json(&claim, &Canonicalizer::new()).unwrap();
    let record = registry.verification_status(&fp).unwrap();
    assert!(!record.is_verified);
    assert!(record.details.contains("does not match"));
}

#[test]
fn recorded_fingerprint_is_skipped() {
    let (registry, oracle) = setup();
    let claim = gpa_claim(3.73);
    let fp = Fingerprint::of_json(&claim, &Canonicalizer::new()).unwrap();
    registry
        .store_verification_result(&owner(), fp, false, VerificationType::Gpa, "manual")
        .unwrap();

    let attestation = oracle.attest(&registry, &claim, VerificationType::Gpa).unwrap();
    assert_eq!(attestation, Attestation::AlreadyRecorded { fingerprint: fp });
    let record = registry.verification_status(&fp).unwrap();
    assert_eq!(record.revision, 1);
    assert_eq!(record.details, "manual");
}

#[test]
fn storage_refusal_is_reported() {
    let registry = Registry::in_memory(owner()).unwrap();
    let oracle = ReferenceOracle::new(oracle_id(), ReferenceRecords::demo());
    let err = oracle
        .attest(&registry, &gpa_claim(3.73), VerificationType::Gpa)
        .unwrap_err();
    assert!(matches!(
        err,
        OracleError::Registry(RegistryError::Unauthorized { .. })
    ));
    assert_eq!(registry.verification_count(), 0);
}

#[test]
fn requests_through_channel_are_attested() {
    let (tx, rx) = mpsc::channel();
    let registry = Registry::create(
        owner(),
        MemoryLedger::new(),
        RegistryConfig::default(),
        Arc::new(ChannelSink::new(tx)),
    )
    .unwrap();
    registry.authorize_oracle(&owner(), &oracle_id()).unwrap();
    let oracle = ReferenceOracle::new(oracle_id(), ReferenceRecords::demo());

    let canonicalizer = Canonicalizer::new();
    let mut claims = ClaimBook::new();
    let matching = claims
        .insert(
            json!({"name": "Kalana De Alwis", "company": "WSO2", "job_title": "Software Engineer"}),
            &canonicalizer,
        )
        .unwrap();
    let unknown = Fingerprint::of_text("no claim on file");

    let requester = id("human:employer");
    registry.request_verification(&requester, matching, VerificationType::Employment);
    registry.request_verification(&requester, unknown, VerificationType::Employment);

    let attestations = oracle.drain(&registry, &rx, &claims).unwrap();
    assert_eq!(attestations.len(), 1);
    assert!(registry.verification_status(&matching).unwrap().is_verified);
    assert!(!registry.verification_exists(&unknown));

    // The completed event from the oracle's own write was queued behind the
    // requests and consumed by the drain.
    assert!(rx.try_recv().is_err());

    registry.request_verification(&requester, matching, VerificationType::Employment);
    let again = oracle.drain(&registry, &rx, &claims).unwrap();
    assert_eq!(again, vec![Attestation::AlreadyRecorded { fingerprint: matching }]);
}

#[test]
fn other_events_are_ignored() {
    let (registry, oracle) = setup();
    let event = RegistryEvent::OracleAuthorized { oracle: oracle_id() };
    assert!(oracle.handle(&registry, &event, &ClaimBook::new()).unwrap().is_none());
}
