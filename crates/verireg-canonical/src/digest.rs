use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::canonicalizer::{CanonicalizationError, Canonicalizer};
use crate::validation::ValidationError;

/// Width of every digest in bytes (SHA-256).
pub const DIGEST_LEN: usize = 32;

macro_rules! digest_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        ///
        /// Rendered and serialized as `0x`-prefixed lowercase hex.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; DIGEST_LEN]);

        impl $name {
            /// Wraps raw digest bytes.
            pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
                Self(bytes)
            }

            /// Builds a digest from a slice, rejecting any other width.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
                let array: [u8; DIGEST_LEN] =
                    bytes
                        .try_into()
                        .map_err(|_| ValidationError::InvalidLength {
                            field: stringify!($name),
                            expected: DIGEST_LEN,
                            actual: bytes.len(),
                        })?;
                Ok(Self(array))
            }

            /// Parses `0x`-prefixed (or bare) hex.
            pub fn parse(value: &str) -> Result<Self, ValidationError> {
                let trimmed = value.trim();
                let hex_part = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .unwrap_or(trimmed);
                let bytes = hex::decode(hex_part).map_err(|e| ValidationError::InvalidHex {
                    field: stringify!($name),
                    reason: e.to_string(),
                })?;
                Self::from_slice(&bytes)
            }

            /// Raw digest bytes.
            pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
                &self.0
            }

            /// Hex encoding with `0x` prefix.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

digest_newtype!(
    Fingerprint,
    "Content fingerprint of an off-system claim; the registry's primary key."
);
digest_newtype!(
    EntryDigest,
    "Digest of one journal record, used to chain records together."
);

impl Fingerprint {
    /// Fingerprints raw bytes: `sha256(bytes)`.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Fingerprints UTF-8 text.
    pub fn of_text(text: &str) -> Self {
        Self::of_bytes(text.as_bytes())
    }

    /// Fingerprints a claim document over its canonical JSON bytes, so key
    /// order and whitespace do not affect the result.
    pub fn of_json(
        value: &Value,
        canonicalizer: &Canonicalizer,
    ) -> Result<Self, CanonicalizationError> {
        let bytes = canonicalizer.canonicalize(value)?;
        Ok(Self::of_bytes(&bytes))
    }
}

impl EntryDigest {
    /// Computes `sha256(domain_separator || payload)`.
    pub fn with_domain(domain_separator: &[u8], payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain_separator);
        hasher.update(payload);
        Self(hasher.finalize().into())
    }
}
