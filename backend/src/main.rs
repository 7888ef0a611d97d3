//! Survey CLI - validate submissions and derive storage records
//!
//! ```bash
//! survey validate submissions.json                 # Check every submission
//! survey derive submissions.json --ip 10.0.0.1     # Emit pseudonymised records
//! survey derive in.json --ip 10.0.0.1 --window day -o records.json
//! ```
//!
//! Input is a JSON array of submission objects (or a single object).
//! Configuration comes from the environment, `.env` included:
//! `SURVEY_DEDUP_WINDOW` (minute|hour|day) and `SURVEY_LOG` (tracing filter).

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use survey::transform::intake::{load_records, RecordErrors};
use survey::{derive_records, logging, validate_records, AppConfig, DedupWindow, RecordDeriver};

/// How many invalid records to print in detail.
const MAX_REPORTED: usize = 5;

#[derive(Parser)]
#[command(name = "survey")]
#[command(about = "Validate survey submissions and derive pseudonymised records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate submissions without deriving anything
    Validate {
        /// Input JSON file (array of submissions)
        input: PathBuf,
    },

    /// Validate submissions and derive storage records
    Derive {
        /// Input JSON file (array of submissions)
        input: PathBuf,

        /// Client address recorded on every derived record
        #[arg(long)]
        ip: String,

        /// Dedup window for derived ids (overrides SURVEY_DEDUP_WINDOW)
        #[arg(short, long)]
        window: Option<DedupWindow>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Config error: {}", e);
            std::process::exit(2);
        }
    };
    logging::init(&config.log_filter);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Derive {
            input,
            ip,
            window,
            output,
        } => {
            let mut derive_config = config.derive;
            if let Some(window) = window {
                derive_config.dedup_window = window;
            }
            cmd_derive(&input, &ip, RecordDeriver::new(derive_config), output.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let records = load_records(input)?;
    let report = validate_records(&records);

    print_errors(&report.errors);
    eprintln!(
        "\n📊 Results: {} valid, {} invalid",
        report.valid_count, report.invalid_count
    );

    if !report.all_valid() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_derive(
    input: &Path,
    ip: &str,
    deriver: RecordDeriver,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());
    eprintln!("   Dedup window: {}", deriver.config().dedup_window);

    let records = load_records(input)?;
    let report = derive_records(&records, ip, &deriver);

    if report.validation.all_valid() {
        eprintln!("   ✅ All {} submissions valid", report.validation.valid_count);
    } else {
        eprintln!("   ✅ Valid: {}", report.validation.valid_count);
        eprintln!("   ❌ Invalid (skipped): {}", report.validation.invalid_count);
        print_errors(&report.validation.errors);
    }

    let json = serde_json::to_string_pretty(&report.records)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Derived {} records", report.records.len());
    Ok(())
}

fn print_errors(errors: &[RecordErrors]) {
    for record in errors.iter().take(MAX_REPORTED) {
        eprintln!("\n❌ Record {} invalid:", record.index);
        for err in &record.errors {
            eprintln!("   - {}", err);
        }
    }
    if errors.len() > MAX_REPORTED {
        eprintln!("\n   ... and {} more", errors.len() - MAX_REPORTED);
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
