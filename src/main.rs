//! Shard audit generator
//!
//! Reads a shard from disk, generates a fresh set of challenges, and prints the public
//! and private audit records as JSON.
//!
//! Run with: cargo run --release -- <SHARD> --audits 12
//! Eager mode (whole shard in memory): cargo run --release -- <SHARD> --eager

use clap::{ArgAction, Parser};
use serde::Serialize;
use shard_audit::{config, Audit, AuditError, AuditStream, PrivateRecord, PublicRecord};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, info_span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for the audit generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the shard to audit
    shard: PathBuf,

    /// Number of challenges to generate
    #[arg(long, default_value_t = config::DEFAULT_AUDIT_COUNT as i64, allow_negative_numbers = true)]
    audits: i64,

    /// Read size when streaming the shard
    #[arg(long, default_value_t = config::DEFAULT_STREAM_CHUNK_SIZE)]
    chunk_size: usize,

    /// Load the whole shard into memory instead of streaming it
    #[arg(long, default_value_t = false)]
    eager: bool,

    /// Write the records here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase output verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Both records, as printed.
#[derive(Serialize)]
struct AuditRecords {
    public: PublicRecord,
    private: PrivateRecord,
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        error!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AuditError> {
    let audit_count = config::validate_audit_count(cli.audits)?;
    if cli.chunk_size == 0 {
        return Err(AuditError::Configuration(
            "--chunk-size must be greater than zero".to_string(),
        ));
    }

    let start = Instant::now();
    let audit = if cli.eager {
        audit_eager(&cli.shard, audit_count)?
    } else {
        audit_streaming(&cli.shard, audit_count, cli.chunk_size)?
    };

    let records = AuditRecords {
        public: audit.get_public_record(),
        private: audit.get_private_record(),
    };

    info!("");
    info!("  ✓ Audited {}", cli.shard.display());
    info!(
        "  ✓ {} challenges, {} leaves, depth {}",
        records.private.challenges.len(),
        records.public.len(),
        records.private.depth
    );
    info!("  ✓ Root: {}", records.private.root);
    info!("  ✓ Took {:.2?}", start.elapsed());
    info!("");

    let json = serde_json::to_string_pretty(&records)
        .map_err(|e| AuditError::Serialization(format!("Failed to encode records: {}", e)))?;
    match &cli.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            info!("  ✓ Records written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn audit_eager(path: &Path, audit_count: usize) -> Result<Audit, AuditError> {
    let _span = info_span!("audit_eager", path = %path.display()).entered();
    let shard = std::fs::read(path)?;
    Audit::new(audit_count, &shard)
}

fn audit_streaming(path: &Path, audit_count: usize, chunk_size: usize) -> Result<Audit, AuditError> {
    let _span = info_span!("audit_streaming", path = %path.display(), chunk_size).entered();

    let mut reader = BufReader::new(File::open(path)?);
    let mut stream = AuditStream::new(audit_count)?;
    let mut buffer = vec![0u8; chunk_size];

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        stream.write(&buffer[..read])?;
    }

    stream.end()?;
    stream.into_audit()
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info,shard_audit=info",
        1 => "debug,shard_audit=debug",
        _ => "shard_audit=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    use tracing_tree::HierarchicalLayer;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            HierarchicalLayer::new(2)
                .with_targets(false)
                .with_bracketed_fields(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
