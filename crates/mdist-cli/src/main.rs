//! # mdist CLI entry point
//!
//! Parses command-line arguments, sets up logging, and dispatches to the
//! subcommand handlers in the library crate.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mdist_cli::export::{run_export, ExportArgs};
use mdist_cli::generate::{run_generate, GenerateArgs};
use mdist_cli::verify::{run_verify, VerifyArgs};

/// Merkle distributor CLI.
///
/// Builds a keccak256 Merkle tree over (index, account, amount) claims,
/// writes per-recipient proofs, verifies published distributions, and
/// exports claims to a key-value namespace.
#[derive(Parser, Debug)]
#[command(name = "mdist", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the tree and claims from a balances file.
    Generate(GenerateArgs),

    /// Verify a claims file against published tree metadata.
    Verify(VerifyArgs),

    /// Upload claims to a key-value namespace.
    Export(ExportArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!("mdist CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Generate(args) => run_generate(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Export(args) => run_export(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
