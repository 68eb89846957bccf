//! # Export Subcommand
//!
//! Uploads a claims file to a key-value namespace, one pair per claim keyed
//! by checksummed address. Connection settings come from flags, falling
//! back to `MDIST_KV_*` environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mdist_store::{open_claim_store, KvConfig, KvOverrides, KvUploader, DEFAULT_BATCH_SIZE};

/// Arguments for the `mdist export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Claims database or `.jsonl` file.
    #[arg(long, value_name = "PATH")]
    pub claims: PathBuf,

    /// API token. Falls back to MDIST_KV_API_TOKEN.
    #[arg(long)]
    pub token: Option<String>,

    /// Account that owns the namespace. Falls back to MDIST_KV_ACCOUNT_ID.
    #[arg(long)]
    pub account_identifier: Option<String>,

    /// Target namespace. Falls back to MDIST_KV_NAMESPACE_ID.
    #[arg(long)]
    pub namespace_identifier: Option<String>,

    /// API base URL. Falls back to MDIST_KV_API_URL.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Pairs per bulk request.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

/// Execute the export subcommand.
pub fn run_export(args: &ExportArgs) -> Result<u8> {
    let config = KvConfig::resolve(KvOverrides {
        api_url: args.api_url.clone(),
        account_id: args.account_identifier.clone(),
        namespace_id: args.namespace_identifier.clone(),
        api_token: args.token.clone(),
    })?;
    tracing::debug!(?config, "export configuration");

    let claims = open_claim_store(&args.claims)?.load_all()?;
    tracing::info!(claims = claims.len(), path = %args.claims.display(), "claims loaded");

    let uploader = KvUploader::new(&config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let written = runtime.block_on(uploader.upload_claims(&claims, args.batch_size))?;

    println!("Exported {written} claims to {}", uploader.endpoint());
    Ok(0)
}
