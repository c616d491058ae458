//! # proofnest CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Everything except `hash` connects to the ledger named by the global
//! `--ledger-url` flag.

use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use proofnest_cli::connection::LedgerArgs;
use proofnest_cli::download::{run_download, DownloadArgs};
use proofnest_cli::exit_code_for;
use proofnest_cli::files::{run_files, FilesArgs};
use proofnest_cli::hash::{run_hash, HashArgs};
use proofnest_cli::register::{run_register, RegisterArgs};
use proofnest_cli::verify::{run_verify, VerifyArgs};

/// Proof registry client.
///
/// Fingerprints files with SHA-256 and records, verifies and retrieves
/// them on a ledger.
#[derive(Parser, Debug)]
#[command(name = "proofnest", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    ledger: LedgerArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print SHA-256 fingerprints of local files.
    Hash(HashArgs),

    /// Register a file on the ledger.
    Register(RegisterArgs),

    /// Look up a fingerprint or a file.
    Verify(VerifyArgs),

    /// Fetch stored bytes with the owner's passkey.
    Download(DownloadArgs),

    /// Search and page through registered proofs.
    Files(FilesArgs),
}

async fn dispatch(cli: &Cli, out: &mut impl Write) -> Result<u8> {
    let registry = match &cli.command {
        Commands::Hash(args) => return run_hash(args, out),
        _ => cli.ledger.connect()?,
    };
    tracing::debug!(backend = registry.backend(), "ledger client ready");

    match &cli.command {
        Commands::Hash(args) => run_hash(args, out),
        Commands::Register(args) => run_register(args, &registry, out).await,
        Commands::Verify(args) => run_verify(args, &registry, out).await,
        Commands::Download(args) => run_download(args, &registry, out).await,
        Commands::Files(args) => run_files(args, &registry, out).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    match dispatch(&cli, &mut stdout).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}
