//! verireg - command-line interface for the oracle-attested verification registry.

use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use verireg_canonical::{Fingerprint, Identity};
use verireg_core::{RegistryConfig, VerificationType};

mod commands;
mod output;
mod path;

use commands::{attest, fingerprint, history, init, list, membership, record, request, seed, status, verify};

#[derive(Parser)]
#[command(name = "verireg")]
#[command(about = "Oracle-attested verification registry")]
struct Cli {
    /// Registry config file (JSON)
    #[arg(long, global = true, env = "VERIREG_CONFIG")]
    config: Option<String>,
    /// Raise log verbosity (-v info, -vv debug); VERIREG_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new registry journal
    Init {
        /// Path to journal file (.vrj)
        journal: String,
        /// Owner identity, also the first oracle
        #[arg(long)]
        owner: Identity,
    },
    /// Grant oracle rights (owner only)
    Authorize {
        /// Path to journal file
        journal: String,
        /// Identity to authorize
        oracle: Identity,
        /// Calling identity
        #[arg(long = "as")]
        caller: Identity,
    },
    /// Revoke oracle rights (owner only)
    Deauthorize {
        /// Path to journal file
        journal: String,
        /// Identity to deauthorize
        oracle: Identity,
        /// Calling identity
        #[arg(long = "as")]
        caller: Identity,
    },
    /// Ask for a fingerprint to be verified; prints the request event
    Request {
        /// Path to journal file
        journal: String,
        /// Fingerprint (0x + 64 hex)
        fingerprint: Fingerprint,
        /// Verification type (gpa, employment, degree, certificate or 0-3)
        #[arg(long = "type")]
        verification_type: VerificationType,
        /// Requesting identity
        #[arg(long = "as")]
        requester: Identity,
    },
    /// Store a verification result (oracles only)
    Record {
        /// Path to journal file
        journal: String,
        /// Fingerprint (0x + 64 hex)
        fingerprint: Fingerprint,
        /// Verification type (gpa, employment, degree, certificate or 0-3)
        #[arg(long = "type")]
        verification_type: VerificationType,
        /// Mark the claim as verified (omit to record a failed verification)
        #[arg(long)]
        verified: bool,
        /// Free-text explanation
        #[arg(long, default_value = "")]
        details: String,
        /// Attesting oracle
        #[arg(long = "as")]
        attester: Identity,
    },
    /// Check a claim document against reference records and store the result
    Attest {
        /// Path to journal file
        journal: String,
        /// Claim document (JSON file)
        #[arg(long)]
        claim: String,
        /// Verification type (gpa, employment, degree, certificate or 0-3)
        #[arg(long = "type")]
        verification_type: VerificationType,
        /// Reference records (JSON file); defaults to the built-in demo set
        #[arg(long)]
        references: Option<String>,
        /// Attesting oracle
        #[arg(long = "as")]
        oracle: Identity,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the record for a fingerprint
    Status {
        /// Path to journal file
        journal: String,
        /// Fingerprint (0x + 64 hex)
        fingerprint: Fingerprint,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print whether a fingerprint has a record (exit 1 if not)
    Exists {
        /// Path to journal file
        journal: String,
        /// Fingerprint (0x + 64 hex)
        fingerprint: Fingerprint,
    },
    /// Print the number of recorded fingerprints
    Count {
        /// Path to journal file
        journal: String,
    },
    /// Print the fingerprint at a creation-order index
    HashAt {
        /// Path to journal file
        journal: String,
        /// Zero-based index
        index: usize,
    },
    /// List records in creation order
    List {
        /// Path to journal file
        journal: String,
        /// First index to show
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Maximum rows (clamped to max_page_size)
        #[arg(long)]
        limit: Option<usize>,
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Show the owner and current oracles
    Oracles {
        /// Path to journal file
        journal: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every attestation of a fingerprint, or an identity's oracle grants
    History {
        /// Path to journal file
        journal: String,
        /// Fingerprint (0x + 64 hex)
        #[arg(required_unless_present = "oracle", conflicts_with = "oracle")]
        fingerprint: Option<Fingerprint>,
        /// Show grants and revocations for this identity instead
        #[arg(long)]
        oracle: Option<Identity>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute the fingerprint of text, a file, or stdin
    Fingerprint {
        /// Input file (or stdin if not provided)
        input: Option<String>,
        /// Hash this text instead of reading input
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,
        /// Parse input as JSON and hash its canonical form
        #[arg(long)]
        json: bool,
    },
    /// Check every journal digest, link and historical authorization
    Verify {
        /// Path to journal file
        journal: String,
        /// Tolerate a truncated final frame
        #[arg(long)]
        permissive: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attest the demonstration GPA, degree and employment claims as the owner
    Seed {
        /// Path to journal file
        journal: String,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("VERIREG_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&str>) -> Result<RegistryConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(RegistryConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {}", path, e))?;
    Ok(RegistryConfig::from_json_str(&text)?)
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Init { journal, owner } => init::run(journal, owner, &config),
        Commands::Authorize {
            journal,
            oracle,
            caller,
        } => membership::authorize(journal, caller, oracle, &config),
        Commands::Deauthorize {
            journal,
            oracle,
            caller,
        } => membership::deauthorize(journal, caller, oracle, &config),
        Commands::Request {
            journal,
            fingerprint,
            verification_type,
            requester,
        } => request::run(journal, requester, fingerprint, verification_type, &config),
        Commands::Record {
            journal,
            fingerprint,
            verification_type,
            verified,
            details,
            attester,
        } => record::run(
            journal,
            attester,
            fingerprint,
            verified,
            verification_type,
            details,
            &config,
        ),
        Commands::Attest {
            journal,
            claim,
            verification_type,
            references,
            oracle,
            json,
        } => attest::run(
            journal,
            claim,
            verification_type,
            references,
            oracle,
            json,
            &config,
        ),
        Commands::Status {
            journal,
            fingerprint,
            json,
        } => status::run(journal, fingerprint, json, &config),
        Commands::Exists {
            journal,
            fingerprint,
        } => {
            let found = status::exists(journal, fingerprint, &config)?;
            return Ok(if found {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Commands::Count { journal } => list::count(journal, &config),
        Commands::HashAt { journal, index } => list::hash_at(journal, index, &config),
        Commands::List {
            journal,
            offset,
            limit,
            json,
        } => list::run(journal, offset, limit, json, &config),
        Commands::Oracles { journal, json } => membership::list(journal, json, &config),
        Commands::History {
            journal,
            fingerprint,
            oracle,
            json,
        } => match (fingerprint, oracle) {
            (_, Some(identity)) => history::oracle(journal, identity, json, &config),
            (Some(fingerprint), None) => history::run(journal, fingerprint, json, &config),
            (None, None) => Err("either a fingerprint or --oracle is required".into()),
        },
        Commands::Fingerprint { input, text, json } => fingerprint::run(input, text, json),
        Commands::Verify {
            journal,
            permissive,
            json,
        } => verify::run(journal, permissive, json),
        Commands::Seed { journal } => seed::run(journal, &config),
    };
    result.map(|()| ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
