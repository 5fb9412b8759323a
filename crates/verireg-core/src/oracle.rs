//! Reference-record oracle.
//!
//! Checks claim documents against a fixed set of university and employment
//! records and stores the outcome in a registry under its own identity.
//! It can be driven directly through [`ReferenceOracle::attest`], or from the
//! `VerificationRequested` events a [`ChannelSink`](crate::ChannelSink)
//! forwards, via [`ReferenceOracle::drain`].

use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use verireg_canonical::{CanonicalizationError, Canonicalizer, Fingerprint, Identity};

use crate::errors::RegistryError;
use crate::events::RegistryEvent;
use crate::ledger::Ledger;
use crate::record::VerificationType;
use crate::registry::Registry;

/// Largest GPA difference still treated as equal.
const GPA_TOLERANCE: f64 = 0.005;

/// Oracle failures. Nothing is stored when one is returned.
#[derive(Error, Debug)]
pub enum OracleError {
    /// The claim document lacks a field its type needs.
    #[error("invalid {verification_type} claim: {reason}")]
    InvalidClaim {
        /// Type the claim was checked as.
        verification_type: VerificationType,
        /// What was wrong.
        reason: String,
    },
    /// Reference records could not be parsed.
    #[error("invalid reference records: {0}")]
    References(#[from] serde_json::Error),
    /// The claim could not be fingerprinted.
    #[error("canonicalization error: {0}")]
    Canonical(#[from] CanonicalizationError),
    /// The registry refused or failed to store the result.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A student's record held by a university.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversityRecord {
    /// Student name.
    pub name: String,
    /// Awarding university.
    pub university: String,
    /// Degree title.
    pub degree: String,
    /// Final grade point average.
    pub gpa: f64,
}

/// A person's record held by an employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRecord {
    /// Employee name.
    pub name: String,
    /// Employer.
    pub company: String,
    /// Position held.
    pub job_title: String,
}

/// Reference data an oracle checks claims against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecords {
    /// University records.
    #[serde(default)]
    pub universities: Vec<UniversityRecord>,
    /// Employment records. A person may have several.
    #[serde(default)]
    pub employment: Vec<EmploymentRecord>,
}

#[derive(Deserialize)]
struct GpaClaim {
    name: String,
    university: String,
    gpa: f64,
}

#[derive(Deserialize)]
struct DegreeClaim {
    name: String,
    university: String,
    degree: String,
}

#[derive(Deserialize)]
struct EmploymentClaim {
    name: String,
    company: String,
    job_title: String,
}

/// Outcome of checking one claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Whether the claim matches the reference records.
    pub is_verified: bool,
    /// Human-readable explanation, stored as the record's details.
    pub details: String,
}

impl Finding {
    fn verified(details: String) -> Self {
        Self {
            is_verified: true,
            details,
        }
    }

    fn rejected(details: String) -> Self {
        Self {
            is_verified: false,
            details,
        }
    }
}

impl ReferenceRecords {
    /// Parses reference records from JSON.
    pub fn from_json_str(text: &str) -> Result<Self, OracleError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Demonstration records: two graduates and two employees.
    pub fn demo() -> Self {
        let graduate = |name: &str, university: &str, degree: &str, gpa| UniversityRecord {
            name: name.to_string(),
            university: university.to_string(),
            degree: degree.to_string(),
            gpa,
        };
        let employee = |name: &str, company: &str, job_title: &str| EmploymentRecord {
            name: name.to_string(),
            company: company.to_string(),
            job_title: job_title.to_string(),
        };
        Self {
            universities: vec![
                graduate(
                    "Kalana De Alwis",
                    "NSBM Green University",
                    "BSc in Software Engineering",
                    3.73,
                ),
                graduate(
                    "Shehani Jayawardena",
                    "University of Colombo",
                    "BSc in Computer Science",
                    3.9,
                ),
            ],
            employment: vec![
                employee("Shehani Jayawardena", "99X Technology", "ML Engineer"),
                employee("Kalana De Alwis", "WSO2", "Software Engineer"),
            ],
        }
    }

    /// Claim documents that every reference record would verify, with their
    /// types.
    pub fn claims(&self) -> Vec<(Value, VerificationType)> {
        let mut claims = Vec::new();
        for u in &self.universities {
            claims.push((
                serde_json::json!({ "name": u.name, "university": u.university, "gpa": u.gpa }),
                VerificationType::Gpa,
            ));
            claims.push((
                serde_json::json!({ "name": u.name, "university": u.university, "degree": u.degree }),
                VerificationType::Degree,
            ));
        }
        for e in &self.employment {
            claims.push((
                serde_json::json!({ "name": e.name, "company": e.company, "job_title": e.job_title }),
                VerificationType::Employment,
            ));
        }
        claims
    }

    fn university(&self, name: &str) -> Option<&UniversityRecord> {
        self.universities.iter().find(|u| u.name == name)
    }

    /// Compares `claim` with the reference records on the fields its type
    /// cares about. Extra fields are ignored.
    pub fn check(
        &self,
        claim: &Value,
        verification_type: VerificationType,
    ) -> Result<Finding, OracleError> {
        let finding = match verification_type {
            VerificationType::Gpa => {
                let c: GpaClaim = parse_claim(claim, verification_type)?;
                match self.university(&c.name) {
                    None => Finding::rejected(format!("No university record for {}", c.name)),
                    Some(r) if r.university == c.university && (r.gpa - c.gpa).abs() < GPA_TOLERANCE => {
                        Finding::verified(format!(
                            "Verified {}'s GPA of {} at {}",
                            c.name, c.gpa, c.university
                        ))
                    }
                    Some(_) => Finding::rejected(format!(
                        "{}'s GPA of {} at {} does not match university records",
                        c.name, c.gpa, c.university
                    )),
                }
            }
            VerificationType::Degree => {
                let c: DegreeClaim = parse_claim(claim, verification_type)?;
                match self.university(&c.name) {
                    None => Finding::rejected(format!("No university record for {}", c.name)),
                    Some(r) if r.university == c.university && r.degree == c.degree => {
                        Finding::verified(format!(
                            "Verified {}'s {} degree from {}",
                            c.name, c.degree, c.university
                        ))
                    }
                    Some(_) => Finding::rejected(format!(
                        "{}'s {} degree from {} does not match university records",
                        c.name, c.degree, c.university
                    )),
                }
            }
            VerificationType::Employment => {
                let c: EmploymentClaim = parse_claim(claim, verification_type)?;
                let mut held = self.employment.iter().filter(|e| e.name == c.name).peekable();
                if held.peek().is_none() {
                    Finding::rejected(format!("No employment record for {}", c.name))
                } else if held.any(|e| e.company == c.company && e.job_title == c.job_title) {
                    Finding::verified(format!(
                        "Verified {} worked at {} as {}",
                        c.name, c.company, c.job_title
                    ))
                } else {
                    Finding::rejected(format!(
                        "{} has no record at {} as {}",
                        c.name, c.company, c.job_title
                    ))
                }
            }
            VerificationType::Certificate => {
                Finding::rejected("No reference source for certificate claims".to_string())
            }
        };
        Ok(finding)
    }
}

fn parse_claim<T: DeserializeOwned>(
    claim: &Value,
    verification_type: VerificationType,
) -> Result<T, OracleError> {
    T::deserialize(claim).map_err(|e| OracleError::InvalidClaim {
        verification_type,
        reason: e.to_string(),
    })
}

/// What the oracle did with one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Attestation {
    /// A result was stored.
    Stored {
        /// Fingerprint of the claim.
        fingerprint: Fingerprint,
        /// Kind of claim.
        verification_type: VerificationType,
        /// Stored outcome.
        is_verified: bool,
        /// Stored explanation.
        details: String,
    },
    /// The fingerprint already had a record; nothing was written.
    AlreadyRecorded {
        /// Fingerprint of the claim.
        fingerprint: Fingerprint,
    },
}

/// Claim documents waiting for a `VerificationRequested` event, keyed by
/// fingerprint.
#[derive(Debug, Default)]
pub struct ClaimBook {
    claims: HashMap<Fingerprint, Value>,
}

impl ClaimBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprints `claim` and files it under that fingerprint.
    pub fn insert(
        &mut self,
        claim: Value,
        canonicalizer: &Canonicalizer,
    ) -> Result<Fingerprint, OracleError> {
        let fingerprint = Fingerprint::of_json(&claim, canonicalizer)?;
        self.claims.insert(fingerprint, claim);
        Ok(fingerprint)
    }

    /// Claim filed under `fingerprint`.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Value> {
        self.claims.get(fingerprint)
    }

    /// Number of filed claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// True when no claims are filed.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Oracle that attests claims against [`ReferenceRecords`].
#[derive(Debug)]
pub struct ReferenceOracle {
    identity: Identity,
    references: ReferenceRecords,
    canonicalizer: Canonicalizer,
}

impl ReferenceOracle {
    /// Oracle acting as `identity`. The identity must be an authorized
    /// oracle of any registry it writes to.
    pub fn new(identity: Identity, references: ReferenceRecords) -> Self {
        Self {
            identity,
            references,
            canonicalizer: Canonicalizer::new(),
        }
    }

    /// Identity results are stored under.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Reference records in use.
    pub fn references(&self) -> &ReferenceRecords {
        &self.references
    }

    /// Fingerprints `claim`, checks it, and stores the result.
    pub fn attest<L: Ledger>(
        &self,
        registry: &Registry<L>,
        claim: &Value,
        verification_type: VerificationType,
    ) -> Result<Attestation, OracleError> {
        let fingerprint = Fingerprint::of_json(claim, &self.canonicalizer)?;
        self.attest_fingerprint(registry, fingerprint, claim, verification_type)
    }

    fn attest_fingerprint<L: Ledger>(
        &self,
        registry: &Registry<L>,
        fingerprint: Fingerprint,
        claim: &Value,
        verification_type: VerificationType,
    ) -> Result<Attestation, OracleError> {
        if registry.verification_exists(&fingerprint) {
            debug!(%fingerprint, "claim already recorded; skipping");
            return Ok(Attestation::AlreadyRecorded { fingerprint });
        }
        let finding = self.references.check(claim, verification_type)?;
        registry.store_verification_result(
            &self.identity,
            fingerprint,
            finding.is_verified,
            verification_type,
            finding.details.clone(),
        )?;
        info!(
            oracle = %self.identity,
            %fingerprint,
            is_verified = finding.is_verified,
            "claim attested"
        );
        Ok(Attestation::Stored {
            fingerprint,
            verification_type,
            is_verified: finding.is_verified,
            details: finding.details,
        })
    }

    /// Handles one registry event. Only `VerificationRequested` events whose
    /// fingerprint is in `claims` produce an attestation.
    pub fn handle<L: Ledger>(
        &self,
        registry: &Registry<L>,
        event: &RegistryEvent,
        claims: &ClaimBook,
    ) -> Result<Option<Attestation>, OracleError> {
        let RegistryEvent::VerificationRequested {
            request_id,
            fingerprint,
            verification_type,
            ..
        } = event
        else {
            return Ok(None);
        };
        let Some(claim) = claims.get(fingerprint) else {
            debug!(%request_id, %fingerprint, "no claim document for request");
            return Ok(None);
        };
        self.attest_fingerprint(registry, *fingerprint, claim, *verification_type)
            .map(Some)
    }

    /// Handles every event already queued on `events` without blocking.
    ///
    /// Stops at the first failure; events after it stay queued.
    pub fn drain<L: Ledger>(
        &self,
        registry: &Registry<L>,
        events: &Receiver<RegistryEvent>,
        claims: &ClaimBook,
    ) -> Result<Vec<Attestation>, OracleError> {
        let mut attestations = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let Some(attestation) = self.handle(registry, &event, claims)? {
                attestations.push(attestation);
            }
        }
        Ok(attestations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gpa_within_tolerance_matches() {
        let refs = ReferenceRecords::demo();
        let claim = json!({"name": "Kalana De Alwis", "university": "NSBM Green University", "gpa": 3.7300001});
        let finding = refs.check(&claim, VerificationType::Gpa).unwrap();
        assert!(finding.is_verified);
        assert!(finding.details.starts_with("Verified"));
    }

    #[test]
    fn wrong_gpa_is_rejected() {
        let refs = ReferenceRecords::demo();
        let claim = json!({"name": "Kalana De Alwis", "university": "NSBM Green University", "gpa": 3.5});
        assert!(!refs.check(&claim, VerificationType::Gpa).unwrap().is_verified);
    }

    #[test]
    fn unknown_person_is_rejected() {
        let refs = ReferenceRecords::demo();
        let claim = json!({"name": "Nobody", "company": "WSO2", "job_title": "Software Engineer"});
        let finding = refs.check(&claim, VerificationType::Employment).unwrap();
        assert!(!finding.is_verified);
        assert_eq!(finding.details, "No employment record for Nobody");
    }

    #[test]
    fn employment_title_must_match() {
        let refs = ReferenceRecords::demo();
        let ok = json!({"name": "Shehani Jayawardena", "company": "99X Technology", "job_title": "ML Engineer"});
        let bad = json!({"name": "Shehani Jayawardena", "company": "99X Technology", "job_title": "Software Developer"});
        assert!(refs.check(&ok, VerificationType::Employment).unwrap().is_verified);
        assert!(!refs.check(&bad, VerificationType::Employment).unwrap().is_verified);
    }

    #[test]
    fn missing_field_is_an_invalid_claim() {
        let refs = ReferenceRecords::demo();
        let claim = json!({"name": "Kalana De Alwis", "gpa": 3.73});
        assert!(matches!(
            refs.check(&claim, VerificationType::Gpa),
            Err(OracleError::InvalidClaim { .. })
        ));
    }

    #[test]
    fn certificates_are_never_verified() {
        let refs = ReferenceRecords::demo();
        let finding = refs.check(&json!({}), VerificationType::Certificate).unwrap();
        assert!(!finding.is_verified);
    }

    #[test]
    fn demo_claims_all_verify() {
        let refs = ReferenceRecords::demo();
        let claims = refs.claims();
        assert_eq!(claims.len(), 6);
        for (claim, verification_type) in &claims {
            assert!(refs.check(claim, *verification_type).unwrap().is_verified);
        }
    }

    #[test]
    fn references_parse_from_json() {
        let refs = ReferenceRecords::from_json_str(
            r#"{"employment": [{"name": "A", "company": "B", "job_title": "C"}]}"#,
        )
        .unwrap();
        assert!(refs.universities.is_empty());
        assert_eq!(refs.employment.len(), 1);
        assert!(ReferenceRecords::from_json_str("[]").is_err());
    }
}
