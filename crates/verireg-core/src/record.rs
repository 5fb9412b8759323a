use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use verireg_canonical::{Fingerprint, Identity};

use crate::errors::RegistryError;

/// Category of claim being verified.
///
/// Wire codes are stable and shared with existing deployments:
/// `Gpa = 0`, `Employment = 1`, `Degree = 2`, `Certificate = 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum VerificationType {
    /// Grade point average claim.
    Gpa,
    /// Employment history claim.
    Employment,
    /// Academic degree claim.
    Degree,
    /// Professional certificate claim.
    Certificate,
}

impl VerificationType {
    /// All known verification types, in code order.
    pub const ALL: [VerificationType; 4] = [
        VerificationType::Gpa,
        VerificationType::Employment,
        VerificationType::Degree,
        VerificationType::Certificate,
    ];

    /// Stable numeric code.
    pub fn code(self) -> u8 {
        match self {
            VerificationType::Gpa => 0,
            VerificationType::Employment => 1,
            VerificationType::Degree => 2,
            VerificationType::Certificate => 3,
        }
    }

    /// Looks up a type by numeric code.
    pub fn from_code(code: u8) -> Result<Self, RegistryError> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| {
                RegistryError::InvalidArgument(format!("unknown verification type code {}", code))
            })
    }
}

impl fmt::Display for VerificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerificationType::Gpa => "GPA",
            VerificationType::Employment => "Employment",
            VerificationType::Degree => "Degree",
            VerificationType::Certificate => "Certificate",
        };
        f.write_str(name)
    }
}

impl FromStr for VerificationType {
    type Err = RegistryError;

    /// Accepts a case-insensitive name (`gpa`, `Degree`) or a numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| RegistryError::InvalidArgument(format!("unknown verification type '{}'", s)))
    }
}

/// Stored outcome of a verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Fingerprint this record is keyed under.
    pub fingerprint: Fingerprint,
    /// Whether the claim was verified.
    pub is_verified: bool,
    /// Category of the claim.
    pub verification_type: VerificationType,
    /// Oracle that wrote this record.
    pub attester: Identity,
    /// Free-text explanation or evidence reference.
    pub details: String,
    /// 1 on creation, incremented on each overwrite.
    pub revision: u32,
}

/// Correlation number returned by `request_verification`.
///
/// Unique per registry instance; it is not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}
