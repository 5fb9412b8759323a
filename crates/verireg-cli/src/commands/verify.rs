//! Verify command implementation.

use serde::Serialize;
use verireg_canonical::{Canonicalizer, EntryDigest};
use verireg_core::{LedgerEntry, RegistryState};
use verireg_journal::{ChainHead, JournalReader, ReadMode};

use super::CommandResult;
use crate::{output, path};

#[derive(Serialize)]
struct RecordReport {
    seq: u64,
    kind: String,
    actor: String,
    digest: EntryDigest,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Walks the journal checking every digest and link, then replays the
/// entries to confirm every historical write was authorized.
///
/// Exits non-zero on the first broken record; records after it are not
/// reported because nothing past a break can be trusted.
pub fn run(journal: String, permissive: bool, json_output: bool) -> CommandResult {
    let journal_path = path::validate_journal_path(&journal, true)
        .map_err(|e| format!("Invalid journal path: {}", e))?;
    let mode = if permissive {
        ReadMode::Permissive
    } else {
        ReadMode::Strict
    };
    let mut reader = JournalReader::open(&journal_path, mode).map_err(|e| {
        let sanitized = path::sanitize_path_for_error(&journal_path);
        format!("Failed to open journal file: {}: {}", sanitized, e)
    })?;

    let canonicalizer = Canonicalizer::new();
    let mut head = ChainHead::new();
    let mut reports = Vec::new();
    let mut entries: Vec<LedgerEntry> = Vec::new();
    let mut failure = None;

    while let Some(record) = reader.read_record()? {
        let check = head.check(&record, &canonicalizer);
        reports.push(RecordReport {
            seq: record.seq,
            kind: record.entry.kind().to_string(),
            actor: record.entry.actor().to_string(),
            digest: record.digest,
            ok: check.is_ok(),
            error: check.as_ref().err().map(|e| e.to_string()),
        });
        if let Err(e) = check {
            failure = Some(e.to_string());
            break;
        }
        head.advance(&record);
        entries.push(record.entry);
    }

    if failure.is_none() {
        if let Err(e) = RegistryState::from_entries(&entries) {
            failure = Some(e.to_string());
        }
    }

    if json_output {
        output::print_json(&serde_json::json!({
            "records": reports,
            "ok": failure.is_none(),
            "error": failure,
        }))?;
    } else {
        println!("{:<6} {:<20} {:<32} {:<68} {}", "SEQ", "KIND", "ACTOR", "DIGEST", "STATUS");
        println!("{}", "-".repeat(140));
        for r in &reports {
            let status = if r.ok { "ok" } else { "BROKEN" };
            println!("{:<6} {:<20} {:<32} {:<68} {}", r.seq, r.kind, r.actor, r.digest, status);
        }
    }

    match failure {
        Some(reason) => Err(format!("journal verification failed: {}", reason).into()),
        None => {
            if !json_output {
                println!("{} records verified", head.next_seq());
            }
            Ok(())
        }
    }
}
