//! The `import` subcommand: analyze an import batch, confirm, commit.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use daftar_lib::CommitError;

use crate::output::{self, OutputFormat};

/// Arguments for the `import` subcommand.
#[derive(Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub store: super::StoreArgs,

    /// Imported rows (CSV with a header row)
    #[arg(long)]
    pub input: PathBuf,

    /// Import profile (TOML)
    #[arg(long)]
    pub profile: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

pub fn run(args: &ImportArgs, format: &OutputFormat) -> Result<()> {
    let profile = super::load_profile(&args.profile)?;
    let rows = super::read_input_rows(&args.input)?;
    let mut store = args.store.open()?;

    let snapshot = store.read_all()?;
    eprintln!(
        "Analyzing {} imported rows against {} stored records",
        rows.len(),
        snapshot.len()
    );

    let plan = daftar_lib::analyze(&snapshot, &rows, &profile)?;
    output::print_plan(&plan, format)?;

    if plan.is_empty() {
        eprintln!("Nothing to commit.");
        return Ok(());
    }

    if !args.yes && !confirm("Commit this plan?")? {
        eprintln!("Aborted; nothing was written.");
        return Ok(());
    }

    match daftar_lib::commit(store.as_mut(), &plan) {
        Ok(receipt) => {
            eprintln!(
                "Commit complete: {} added, {} updated at {}",
                receipt.additions_applied,
                receipt.updates_applied,
                receipt.committed_at.format("%Y-%m-%d %H:%M:%SZ")
            );
            Ok(())
        }
        Err(err) => {
            if let CommitError::Update {
                additions_applied, ..
            } = &err
            {
                eprintln!(
                    "{} appended rows were stored before the failure.",
                    additions_applied
                );
            }
            eprintln!("Re-running this import is safe: stored rows and filled fields are recognized and not duplicated.");
            Err(err.into())
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N] ", question);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
