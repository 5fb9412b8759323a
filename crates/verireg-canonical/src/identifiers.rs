use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const IDENTITY_PATTERN: &str =
    r"^((human|service|oracle|org):[a-z][a-z0-9_.-]{0,62}|0x[0-9a-fA-F]{40})$";

fn identity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IDENTITY_PATTERN).expect("invalid regex"))
}

/// Caller identity as supplied by the hosting environment.
///
/// Either `kind:name` (`human:alice`, `oracle:uni-registrar`) or an account
/// address (`0x` + 40 hex digits). The registry never authenticates an
/// identity; it only authorizes it against the owner and oracle set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Parses a validated identity.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !identity_regex().is_match(&s) {
            return Err(ValidationError::PatternMismatch {
                field: "Identity",
                value: s,
            });
        }
        Ok(Self(s))
    }

    /// Borrowed string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}
