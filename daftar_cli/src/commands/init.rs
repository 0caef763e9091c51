//! The `init` subcommand: create an empty registry from a profile.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use daftar_lib::daftar_store::{CsvStore, SqliteStore};

/// Arguments for the `init` subcommand.
#[derive(Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub store: super::StoreArgs,

    /// Import profile (TOML) carrying the field layout
    #[arg(long)]
    pub profile: PathBuf,
}

pub fn run(args: &InitArgs) -> Result<()> {
    let profile = super::load_profile(&args.profile)?;

    match (&args.store.db, &args.store.sheet) {
        (Some(db), None) => {
            let store = SqliteStore::open(db)?;
            store.init(&profile.fields)?;
            eprintln!(
                "Initialized registry {} ({} fields)",
                db.display(),
                profile.fields.len()
            );
        }
        (None, Some(sheet)) => {
            CsvStore::create(sheet, &profile.fields)?;
            eprintln!(
                "Initialized sheet {} ({} fields)",
                sheet.display(),
                profile.fields.len()
            );
        }
        _ => bail!("pass exactly one of --db or --sheet"),
    }

    Ok(())
}
