//! # Generate Subcommand
//!
//! Reads a balances file, builds the tree, and writes two artifacts:
//!
//! - `<stem>.tree.json`: `{ root, tokenTotal, recipientsCount }`
//! - `<stem>.claims.sqlite`: the claims database, or `<stem>.claims.jsonl`
//!   with `--claims-format jsonl`
//!
//! The input format is chosen by extension: `.json` or `.csv`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use mdist_balances::RawBalances;
use mdist_core::DistributorError;
use mdist_store::open_claim_store;
use mdist_tree::generate_distribution;

/// Arguments for the `mdist generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Balances file (.json or .csv).
    #[arg(long, short, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory for the outputs. Defaults to the input's directory.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Also write the full distributor info (root, total, all claims).
    #[arg(long, value_name = "PATH")]
    pub info_out: Option<PathBuf>,

    /// Storage format for the claims artifact.
    #[arg(long, value_enum, default_value_t = ClaimsFormat::Sqlite)]
    pub claims_format: ClaimsFormat,
}

/// On-disk format of the claims artifact.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClaimsFormat {
    /// SQLite database with a `claims` table.
    #[default]
    Sqlite,
    /// One JSON claim record per line.
    Jsonl,
}

impl ClaimsFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Jsonl => "jsonl",
        }
    }
}

/// Paths written by a generate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPaths {
    pub tree_info: PathBuf,
    pub claims: PathBuf,
}

impl GeneratedPaths {
    /// Output paths for `input`, placed in `out_dir` or beside the input.
    pub fn for_input(input: &Path, out_dir: Option<&Path>, format: ClaimsFormat) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "balances".to_string());
        let dir = out_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Self {
            tree_info: dir.join(format!("{stem}.tree.json")),
            claims: dir.join(format!("{stem}.claims.{}", format.extension())),
        }
    }
}

/// Read balances from `path`, choosing the parser by extension.
pub fn load_balances(path: &Path) -> Result<RawBalances> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    let balances = match ext.as_deref() {
        Some("json") => {
            let file = File::open(path)
                .with_context(|| format!("failed to open balances file: {}", path.display()))?;
            RawBalances::from_json_reader(BufReader::new(file))
        }
        Some("csv") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read balances file: {}", path.display()))?;
            RawBalances::from_csv_str(&text)
        }
        _ => Err(DistributorError::MalformedInput(format!(
            "unsupported balances format (expected .json or .csv): {}",
            path.display()
        ))),
    };
    balances.with_context(|| format!("failed to parse balances file: {}", path.display()))
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs) -> Result<u8> {
    let raw = load_balances(&args.input)?;
    tracing::info!(path = %args.input.display(), records = raw.len(), "balances loaded");

    let info = generate_distribution(raw)?;
    let paths =
        GeneratedPaths::for_input(&args.input, args.out_dir.as_deref(), args.claims_format);

    if let Some(dir) = paths.claims.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
        }
    }

    let mut store = open_claim_store(&paths.claims)?;
    store.bulk_write(&info.claims)?;

    let tree_json = serde_json::to_string_pretty(&info.tree_info())?;
    std::fs::write(&paths.tree_info, tree_json + "\n")
        .with_context(|| format!("failed to write {}", paths.tree_info.display()))?;

    if let Some(ref info_out) = args.info_out {
        let file = File::create(info_out)
            .with_context(|| format!("failed to create {}", info_out.display()))?;
        serde_json::to_writer_pretty(file, &info)
            .with_context(|| format!("failed to write {}", info_out.display()))?;
        println!("Distributor info: {}", info_out.display());
    }

    println!("Claims:    {}", paths.claims.display());
    println!("Tree info: {}", paths.tree_info.display());
    println!("Root:      {}", info.merkle_root);
    Ok(0)
}
