use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config document could not be parsed.
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds an unusable value.
    #[error("{field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// What happens when a fingerprint that already has a record is written again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Any current oracle may overwrite; the index is kept and the revision bumped.
    #[default]
    Overwrite,
    /// Only the oracle that wrote the current record may overwrite it.
    SameAttesterOnly,
    /// The first successful write is final.
    RejectOverwrite,
}

/// Runtime limits and policies for a registry instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Maximum `details` length in bytes.
    /// Default: 1024.
    pub max_details_len: usize,

    /// Largest page returned by `fingerprints(offset, limit)`.
    /// Default: 256.
    pub max_page_size: usize,

    /// Policy for repeated writes to one fingerprint.
    /// Default: `overwrite`.
    pub overwrite_policy: OverwritePolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_details_len: 1024,
            max_page_size: 256,
            overwrite_policy: OverwritePolicy::Overwrite,
        }
    }
}

/// Hard ceiling for `max_details_len`; keeps a single journal frame small.
pub const DETAILS_LEN_CEILING: usize = 64 * 1024;

impl RegistryConfig {
    /// Parses a JSON config document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_details_len == 0 || self.max_details_len > DETAILS_LEN_CEILING {
            return Err(ConfigError::Invalid {
                field: "max_details_len",
                reason: format!("must be in 1..={}", DETAILS_LEN_CEILING),
            });
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "max_page_size",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
