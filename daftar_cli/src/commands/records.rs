//! The `records` subcommand: list stored registry rows.

use anyhow::Result;
use clap::Args;

use crate::output::{self, OutputFormat};

/// Arguments for the `records` subcommand.
#[derive(Args)]
pub struct RecordsArgs {
    #[command(flatten)]
    pub store: super::StoreArgs,

    /// Maximum rows to display
    #[arg(long, default_value = "50")]
    pub limit: usize,
}

pub fn run(args: &RecordsArgs, format: &OutputFormat) -> Result<()> {
    let store = args.store.open()?;
    let fields = store.field_names()?;
    let mut snapshot = store.read_all()?;

    let total = snapshot.len();
    snapshot.truncate(args.limit);
    output::print_records(&fields, &snapshot, format)?;
    if total > args.limit {
        eprintln!("Showing {} of {} records", args.limit, total);
    }

    Ok(())
}
