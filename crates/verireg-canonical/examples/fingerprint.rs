use serde_json::json;
use verireg_canonical::{Canonicalizer, Fingerprint};

fn main() {
    let canonicalizer = Canonicalizer::new();
    let claim = json!({
        "name": "Shehani Jayawardena",
        "university": "University of Colombo",
        "degree": "BSc in Computer Science"
    });

    match Fingerprint::of_json(&claim, &canonicalizer) {
        Ok(fp) => println!("{}", fp),
        Err(err) => {
            eprintln!("fingerprinting failed: {}", err);
            std::process::exit(1);
        }
    }
}
