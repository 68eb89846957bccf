//! # Verify Subcommand
//!
//! Checks a claims file against published tree metadata using only the
//! independent verifier. Claims are streamed from the store; every failing
//! claim is logged before the overall result.
//!
//! The published `recipientsCount` and `tokenTotal` are also compared with
//! the claim set. They are not committed to by the root, but a mismatch
//! means the metadata describes a different distribution.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mdist_core::{Amount, TokenTotal, TreeInfo};
use mdist_store::open_claim_store;
use mdist_verify::DistributionVerifier;

/// Arguments for the `mdist verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Published tree metadata (`<stem>.tree.json`).
    #[arg(long, value_name = "PATH")]
    pub root: PathBuf,

    /// Claims database or `.jsonl` file.
    #[arg(long, value_name = "PATH")]
    pub claims: PathBuf,
}

/// Execute the verify subcommand.
///
/// Returns exit code: 0 if the distribution verifies, 1 otherwise.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let file = File::open(&args.root)
        .with_context(|| format!("failed to open tree info: {}", args.root.display()))?;
    let published: TreeInfo = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse tree info: {}", args.root.display()))?;
    tracing::info!(root = %published.root, "verifying against published root");

    let store = open_claim_store(&args.claims)?;
    let mut verifier = DistributionVerifier::new(published.root);
    let mut amounts: Vec<Amount> = Vec::new();
    for claim in store.iterate()? {
        let claim = claim?;
        verifier.check(&claim);
        amounts.push(claim.amount);
    }
    let report = verifier.finish();

    let mut ok = report.is_valid();
    for err in report.errors() {
        tracing::error!("{err}");
    }

    let checked = report.checked as u64;
    if checked != published.recipients_count {
        tracing::error!(
            published = published.recipients_count,
            actual = checked,
            "recipient count does not match tree info"
        );
        ok = false;
    }
    let total = TokenTotal::from_amounts(&amounts);
    if total != published.token_total {
        tracing::error!(
            published = %published.token_total,
            actual = %total,
            "token total does not match tree info"
        );
        ok = false;
    }

    println!("Claims checked:     {}", report.checked);
    println!("Failed proofs:      {}", report.failures.len());
    match report.reconstructed_root {
        Some(root) => println!("Reconstructed root: {root}"),
        None => println!("Reconstructed root: (none)"),
    }
    println!("Root matches:       {}", report.root_matches());

    if ok {
        println!("Distribution verified");
        Ok(0)
    } else {
        println!("Distribution verification FAILED");
        Ok(1)
    }
}
