use verireg_canonical::{Canonicalizer, EntryDigest, Fingerprint, Identity};
use serde_json::json;

#[test]
fn text_fingerprint_matches_sha256_vector() {
    // sha256("abc") from FIPS 180-2.
    let fp = Fingerprint::of_text("abc");
    assert_eq!(
        fp.to_hex(),
        "0xba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn fingerprint_serializes_to_golden_json() {
    let fp = Fingerprint::from_bytes([0xab; 32]);
    assert_eq!(
        serde_json::to_string(&fp).unwrap(),
        format!("\"0x{}\"", "ab".repeat(32))
    );
    let back: Fingerprint = serde_json::from_str(&serde_json::to_string(&fp).unwrap()).unwrap();
    assert_eq!(back, fp);
}

#[test]
fn canonicalizer_produces_ordered_bytes() {
    let canonicalizer = Canonicalizer::new();
    let value = json!({"b": 1, "a": {"nested": 2}});
    let bytes = canonicalizer.canonicalize(&value).unwrap();
    assert_eq!(bytes, br#"{"a":{"nested":2},"b":1}"#.to_vec());
}

#[test]
fn claim_fingerprint_is_hash_of_canonical_bytes() {
    let canonicalizer = Canonicalizer::new();
    let claim = json!({
        "university": "NSBM Green University",
        "name": "Kalana De Alwis",
        "gpa": 3.73
    });
    let canonical = canonicalizer.canonicalize(&claim).unwrap();
    assert_eq!(
        Fingerprint::of_json(&claim, &canonicalizer).unwrap(),
        Fingerprint::of_bytes(&canonical)
    );
}

#[test]
fn entry_digest_and_fingerprint_do_not_cross_parse_widths() {
    let digest = EntryDigest::with_domain(b"verireg:test\0", b"x");
    let as_fp: Fingerprint = digest.to_hex().parse().unwrap();
    assert_eq!(as_fp.as_bytes(), digest.as_bytes());
}

#[test]
fn identity_serializes_transparently() {
    let id = Identity::parse("oracle:registrar").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""oracle:registrar""#);
}
