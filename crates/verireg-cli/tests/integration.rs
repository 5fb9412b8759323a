//! Integration tests for CLI commands.

use std::process::Command;
use tempfile::TempDir;
use verireg_canonical::Fingerprint;

fn run_cli(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_verireg"))
        .args(args)
        .env_remove("VERIREG_CONFIG")
        .env_remove("VERIREG_LOG")
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    (output.status.success(), stdout, stderr)
}

fn test_data_hash() -> String {
    Fingerprint::of_text("Test data").to_hex()
}

/// Fresh registry owned by `human:owner`.
fn create_registry() -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let journal_path = temp_dir.path().join("registry.vrj");
    let journal = journal_path.to_string_lossy().to_string();

    let (success, stdout, stderr) = run_cli(&["init", &journal, "--owner", "human:owner"]);
    assert!(success, "init failed: {}", stderr);
    assert!(stdout.contains("human:owner"));
    (temp_dir, journal)
}

#[test]
fn test_init_refuses_existing_journal() {
    let (_temp_dir, journal) = create_registry();
    let (success, _, stderr) = run_cli(&["init", &journal, "--owner", "human:other"]);
    assert!(!success);
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_oracle_records_and_status() {
    let (_temp_dir, journal) = create_registry();
    let hash = test_data_hash();

    let (success, _, _) = run_cli(&["authorize", &journal, "oracle:x", "--as", "human:owner"]);
    assert!(success);

    let (success, stdout, stderr) = run_cli(&["exists", &journal, &hash]);
    assert!(!success);
    assert_eq!(stdout.trim(), "false");
    assert!(!stderr.contains("Error:"));

    let (success, _, stderr) = run_cli(&[
        "record", &journal, &hash, "--type", "gpa", "--verified", "--details", "details", "--as",
        "oracle:x",
    ]);
    assert!(success, "record failed: {}", stderr);

    let (success, stdout, _) = run_cli(&["status", &journal, &hash, "--json"]);
    assert!(success);
    let record: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(record["is_verified"], true);
    assert_eq!(record["verification_type"], "gpa");
    assert_eq!(record["attester"], "oracle:x");
    assert_eq!(record["details"], "details");

    let (success, stdout, _) = run_cli(&["exists", &journal, &hash]);
    assert!(success);
    assert_eq!(stdout.trim(), "true");
}

#[test]
fn test_non_oracle_is_rejected() {
    let (_temp_dir, journal) = create_registry();
    let hash = test_data_hash();

    let (success, _, stderr) = run_cli(&[
        "record", &journal, &hash, "--type", "degree", "--verified", "--as", "human:stranger",
    ]);
    assert!(!success);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("oracle"));

    let (success, _, _) = run_cli(&["authorize", &journal, "oracle:x", "--as", "human:stranger"]);
    assert!(!success);

    let (_, stdout, _) = run_cli(&["count", &journal]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_count_and_hash_at() {
    let (_temp_dir, journal) = create_registry();
    let first = Fingerprint::of_text("Data 1").to_hex();
    let second = Fingerprint::of_text("Data 2").to_hex();

    for (hash, details) in [(&first, "Details 1"), (&second, "Details 2")] {
        let (success, _, _) = run_cli(&[
            "record", &journal, hash, "--type", "employment", "--details", details, "--as",
            "human:owner",
        ]);
        assert!(success);
    }

    let (_, stdout, _) = run_cli(&["count", &journal]);
    assert_eq!(stdout.trim(), "2");
    let (_, stdout, _) = run_cli(&["hash-at", &journal, "0"]);
    assert_eq!(stdout.trim(), first);
    let (_, stdout, _) = run_cli(&["hash-at", &journal, "1"]);
    assert_eq!(stdout.trim(), second);

    let (success, _, stderr) = run_cli(&["hash-at", &journal, "2"]);
    assert!(!success);
    assert!(stderr.contains("out of range"));

    let (success, stdout, _) = run_cli(&["list", &journal]);
    assert!(success);
    assert!(stdout.contains("FINGERPRINT"));
    assert!(stdout.contains(&first));
}

#[test]
fn test_deauthorized_record_survives_and_history() {
    let (_temp_dir, journal) = create_registry();
    let hash = test_data_hash();

    run_cli(&["authorize", &journal, "oracle:x", "--as", "human:owner"]);
    run_cli(&[
        "record", &journal, &hash, "--type", "certificate", "--verified", "--details", "v1", "--as",
        "oracle:x",
    ]);
    run_cli(&[
        "record", &journal, &hash, "--type", "certificate", "--details", "v2", "--as",
        "human:owner",
    ]);
    let (success, _, _) = run_cli(&["deauthorize", &journal, "oracle:x", "--as", "human:owner"]);
    assert!(success);

    let (_, stdout, _) = run_cli(&["oracles", &journal, "--json"]);
    let oracles: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(oracles["oracles"], serde_json::json!(["human:owner"]));

    let (success, stdout, _) = run_cli(&["history", &journal, &hash, "--json"]);
    assert!(success);
    let history: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[0]["attester"], "oracle:x");
    assert_eq!(history[1]["details"], "v2");

    let (success, stdout, _) = run_cli(&["history", &journal, "--oracle", "oracle:x"]);
    assert!(success);
    assert!(stdout.contains("granted"));
    assert!(stdout.contains("revoked"));
}

#[test]
fn test_request_prints_event() {
    let (_temp_dir, journal) = create_registry();
    let hash = test_data_hash();

    let (success, stdout, _) = run_cli(&[
        "request", &journal, &hash, "--type", "0", "--as", "human:applicant",
    ]);
    assert!(success);
    let event: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(event["event"], "VerificationRequested");
    assert_eq!(event["fingerprint"], hash);
    assert_eq!(event["requester"], "human:applicant");

    let (_, stdout, _) = run_cli(&["count", &journal]);
    assert_eq!(stdout.trim(), "0");
}

#[test]
fn test_fingerprint_command() {
    let (success, stdout, _) = run_cli(&["fingerprint", "--text", "Test data"]);
    assert!(success);
    assert_eq!(stdout.trim(), test_data_hash());

    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a.json");
    let b = temp_dir.path().join("b.json");
    std::fs::write(&a, r#"{"name": "A", "gpa": 3.5}"#).unwrap();
    std::fs::write(&b, r#"{"gpa":3.5,"name":"A"}"#).unwrap();
    let (_, out_a, _) = run_cli(&["fingerprint", "--json", a.to_str().unwrap()]);
    let (_, out_b, _) = run_cli(&["fingerprint", "--json", b.to_str().unwrap()]);
    assert_eq!(out_a, out_b);
}

#[test]
fn test_seed_and_verify() {
    let (_temp_dir, journal) = create_registry();

    let (success, stdout, stderr) = run_cli(&["seed", &journal]);
    assert!(success, "seed failed: {}", stderr);
    assert!(stdout.contains("Added 6"));

    // Seeding again adds nothing.
    let (_, stdout, _) = run_cli(&["seed", &journal]);
    assert!(stdout.contains("Added 0"));
    let (_, stdout, _) = run_cli(&["count", &journal]);
    assert_eq!(stdout.trim(), "6");

    let (success, stdout, _) = run_cli(&["verify", &journal, "--json"]);
    assert!(success);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["ok"], true);
    assert_eq!(report["records"].as_array().unwrap().len(), 7);
}

#[test]
fn test_verify_detects_tampering() {
    let (_temp_dir, journal) = create_registry();
    run_cli(&[
        "record", &journal, &test_data_hash(), "--type", "gpa", "--verified", "--details",
        "original", "--as", "human:owner",
    ]);

    let mut bytes = std::fs::read(&journal).unwrap();
    let at = bytes
        .windows(b"original".len())
        .position(|w| w == b"original")
        .unwrap();
    bytes[at] = b'O';
    std::fs::write(&journal, &bytes).unwrap();

    let (success, stdout, stderr) = run_cli(&["verify", &journal]);
    assert!(!success);
    assert!(stdout.contains("BROKEN"));
    assert!(stderr.contains("verification failed"));

    let (success, _, _) = run_cli(&["count", &journal]);
    assert!(!success);
}

#[test]
fn test_config_limits_details() {
    let (temp_dir, journal) = create_registry();
    let config = temp_dir.path().join("config.json");
    std::fs::write(&config, r#"{"max_details_len": 4}"#).unwrap();

    let (success, _, stderr) = run_cli(&[
        "--config",
        config.to_str().unwrap(),
        "record",
        &journal,
        &test_data_hash(),
        "--type",
        "gpa",
        "--details",
        "too long",
        "--as",
        "human:owner",
    ]);
    assert!(!success);
    assert!(stderr.contains("details"));

    std::fs::write(&config, r#"{"max_details_len": 0}"#).unwrap();
    let (success, _, stderr) = run_cli(&["--config", config.to_str().unwrap(), "count", &journal]);
    assert!(!success);
    assert!(stderr.contains("max_details_len"));
}

#[test]
fn test_invalid_arguments() {
    let (_temp_dir, journal) = create_registry();

    let (success, _, _) = run_cli(&["status", &journal, "0x1234"]);
    assert!(!success);
    let (success, _, _) = run_cli(&[
        "record", &journal, &test_data_hash(), "--type", "7", "--as", "human:owner",
    ]);
    assert!(!success);
    let (success, _, _) = run_cli(&["count", "registry.json"]);
    assert!(!success);

    let (success, _, stderr) = run_cli(&["status", &journal, &test_data_hash()]);
    assert!(!success);
    assert!(stderr.contains("Error:"));
}

fn write_claim(dir: &TempDir, name: &str, claim: serde_json::Value) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, claim.to_string()).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_attest_checks_claims_against_references() {
    let (temp_dir, journal) = create_registry();
    let (success, _, _) = run_cli(&["authorize", &journal, "oracle:registrar", "--as", "human:owner"]);
    assert!(success);

    let good = write_claim(
        &temp_dir,
        "good.json",
        serde_json::json!({"name": "Kalana De Alwis", "university": "NSBM Green University", "gpa": 3.73}),
    );
    let (success, stdout, stderr) = run_cli(&[
        "attest", &journal, "--claim", &good, "--type", "gpa", "--as", "oracle:registrar", "--json",
    ]);
    assert!(success, "attest failed: {}", stderr);
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["outcome"], "stored");
    assert_eq!(outcome["is_verified"], true);

    let bad = write_claim(
        &temp_dir,
        "bad.json",
        serde_json::json!({"name": "Kalana De Alwis", "university": "NSBM Green University", "gpa": 3.5}),
    );
    let (success, stdout, _) = run_cli(&[
        "attest", &journal, "--claim", &bad, "--type", "gpa", "--as", "oracle:registrar", "--json",
    ]);
    assert!(success);
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["is_verified"], false);

    // The same claim again is left alone.
    let (success, stdout, _) = run_cli(&[
        "attest", &journal, "--claim", &good, "--type", "gpa", "--as", "oracle:registrar",
    ]);
    assert!(success);
    assert!(stdout.contains("Already recorded"));

    let (_, stdout, _) = run_cli(&["count", &journal]);
    assert_eq!(stdout.trim(), "2");
}

#[test]
fn test_attest_requires_oracle() {
    let (temp_dir, journal) = create_registry();
    let claim = write_claim(
        &temp_dir,
        "claim.json",
        serde_json::json!({"name": "Kalana De Alwis", "company": "WSO2", "job_title": "Software Engineer"}),
    );
    let (success, _, stderr) = run_cli(&[
        "attest", &journal, "--claim", &claim, "--type", "employment", "--as", "oracle:unknown",
    ]);
    assert!(!success);
    assert!(stderr.contains("unauthorized"));
    let (_, stdout, _) = run_cli(&["count", &journal]);
    assert_eq!(stdout.trim(), "0");
}
