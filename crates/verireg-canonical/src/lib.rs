//! Canonical primitives shared by every verireg crate.
//!
//! Anything that participates in hashing lives here: the canonical JSON
//! encoder used for claim documents and journal entries, the 32-byte digest
//! newtypes (`Fingerprint`, `EntryDigest`), and the validated `Identity`
//! principal type that callers present to the registry.
//!
#![deny(missing_docs)]

/// Canonicalization helpers for deterministic hashing.
pub mod canonicalizer;
/// Fixed-width SHA-256 digest newtypes.
pub mod digest;
/// Principal identifiers.
pub mod identifiers;
/// Validation helpers used by canonical types.
pub mod validation;

pub use canonicalizer::{CanonicalizationError, Canonicalizer};
pub use digest::{EntryDigest, Fingerprint, DIGEST_LEN};
pub use identifiers::Identity;
pub use validation::ValidationError;
