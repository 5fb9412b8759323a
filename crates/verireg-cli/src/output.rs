//! Output formatting utilities.

use serde::Serialize;
use verireg_core::VerificationRecord;
use verireg_store::Attestation;

/// Prints any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints the header for record tables.
#[allow(clippy::print_literal)]
pub fn print_record_header() {
    println!(
        "{:<6} {:<68} {:<9} {:<12} {}",
        "INDEX", "FINGERPRINT", "VERIFIED", "TYPE", "ATTESTER"
    );
    println!("{}", "-".repeat(120));
}

/// Formats one record as a table row.
pub fn format_record_row(index: usize, record: &VerificationRecord) -> String {
    format!(
        "{:<6} {:<68} {:<9} {:<12} {}",
        index,
        record.fingerprint,
        record.is_verified,
        record.verification_type.to_string(),
        record.attester
    )
}

/// Prints a single record as `key: value` lines.
pub fn print_record(record: &VerificationRecord) {
    println!("fingerprint: {}", record.fingerprint);
    println!("verified:    {}", record.is_verified);
    println!("type:        {}", record.verification_type);
    println!("attester:    {}", record.attester);
    println!("revision:    {}", record.revision);
    println!("details:     {}", record.details);
}

/// Prints the header for attestation history tables.
#[allow(clippy::print_literal)]
pub fn print_history_header() {
    println!(
        "{:<6} {:<9} {:<12} {:<32} {}",
        "SEQ", "VERIFIED", "TYPE", "ATTESTER", "DETAILS"
    );
    println!("{}", "-".repeat(100));
}

/// Formats one historical attestation as a table row.
pub fn format_history_row(attestation: &Attestation) -> String {
    format!(
        "{:<6} {:<9} {:<12} {:<32} {}",
        attestation.seq,
        attestation.is_verified,
        attestation.verification_type.to_string(),
        truncate(attestation.attester.as_str(), 32),
        truncate(&attestation.details, 60)
    )
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
