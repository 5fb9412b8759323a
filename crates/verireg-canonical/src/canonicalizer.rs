use canonical_json::to_string;
use serde::Serialize;
use serde_json::Value;

use std::fmt;

/// Default nesting limit for canonicalized documents.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// Provided JSON could not be canonicalized.
    #[error("invalid JSON structure: {0}")]
    InvalidStructure(String),
    /// Non-finite number (NaN/Infinity) detected.
    #[error("non-finite number detected at {0}")]
    NonFiniteNumber(String),
    /// Document nests deeper than the configured limit.
    #[error("nesting deeper than {max} at {path}")]
    TooDeep {
        /// JSON path where the limit was hit.
        path: String,
        /// Configured limit.
        max: usize,
    },
    /// Value could not be converted to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Generic failure.
    #[error("other error: {0}")]
    Other(String),
}

/// Helper for building JSON paths during validation.
#[derive(Debug, Clone)]
struct Path {
    segments: Vec<String>,
}

impl Path {
    fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    fn depth(&self) -> usize {
        self.segments.len()
    }

    fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }

    fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("[{}]", index));
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Canonicalizer that emits deterministic RFC 8785 bytes.
///
/// Claim documents are fingerprinted over these bytes, so two documents that
/// differ only in key order or whitespace map to the same fingerprint.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    max_depth: usize,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Canonicalizer {
    /// Creates a canonicalizer with the default nesting limit.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates a canonicalizer with a custom nesting limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Produces canonical bytes for a JSON value.
    pub fn canonicalize(&self, value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
        self.validate(value, Path::root())?;

        let canonical =
            to_string(value).map_err(|err| CanonicalizationError::Other(err.to_string()))?;
        Ok(canonical.into_bytes())
    }

    /// Serializes any value to JSON, then canonicalizes it.
    pub fn canonicalize_serialize<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, CanonicalizationError> {
        let value = serde_json::to_value(value)?;
        self.canonicalize(&value)
    }

    fn validate(&self, value: &Value, path: Path) -> Result<(), CanonicalizationError> {
        if path.depth() > self.max_depth {
            return Err(CanonicalizationError::TooDeep {
                path: path.to_string(),
                max: self.max_depth,
            });
        }
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.validate(child, path.push_field(key))?;
                }
                Ok(())
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    self.validate(item, path.push_index(idx))?;
                }
                Ok(())
            }
            Value::Number(num) => {
                if let Some(f) = num.as_f64() {
                    if !f.is_finite() {
                        return Err(CanonicalizationError::NonFiniteNumber(path.to_string()));
                    }
                }
                Ok(())
            }
            Value::String(_) | Value::Bool(_) | Value::Null => Ok(()),
        }
    }
}
