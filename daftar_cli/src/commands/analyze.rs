//! The `analyze` subcommand: dry-run an import batch.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::output::{self, OutputFormat};

/// Arguments for the `analyze` subcommand.
#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub store: super::StoreArgs,

    /// Imported rows (CSV with a header row)
    #[arg(long)]
    pub input: PathBuf,

    /// Import profile (TOML)
    #[arg(long)]
    pub profile: PathBuf,
}

pub fn run(args: &AnalyzeArgs, format: &OutputFormat) -> Result<()> {
    let profile = super::load_profile(&args.profile)?;
    let rows = super::read_input_rows(&args.input)?;
    let store = args.store.open()?;

    let snapshot = store.read_all()?;
    eprintln!(
        "Analyzing {} imported rows against {} stored records",
        rows.len(),
        snapshot.len()
    );

    let plan = daftar_lib::analyze(&snapshot, &rows, &profile)?;
    output::print_plan(&plan, format)?;
    eprintln!("Dry run: nothing was written.");

    Ok(())
}
