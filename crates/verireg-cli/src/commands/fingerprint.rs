//! Fingerprint command implementation.

use std::io::{self, Read};

use serde_json::Value;
use verireg_canonical::{Canonicalizer, Fingerprint};

use super::CommandResult;

/// Prints the fingerprint of `--text`, or of a file / stdin.
///
/// With `json`, the input is parsed and hashed over its canonical form, so
/// key order and whitespace do not change the result.
pub fn run(input: Option<String>, text: Option<String>, json: bool) -> CommandResult {
    let bytes = match (text, input) {
        (Some(text), _) => text.into_bytes(),
        (None, Some(path)) => std::fs::read(&path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?,
        (None, None) => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    };

    let fingerprint = if json {
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| format!("Invalid JSON: {}", e))?;
        Fingerprint::of_json(&value, &Canonicalizer::new())
            .map_err(|e| format!("Canonicalization failed: {}", e))?
    } else {
        Fingerprint::of_bytes(&bytes)
    };

    println!("{}", fingerprint);
    Ok(())
}
