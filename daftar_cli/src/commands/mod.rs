pub mod analyze;
pub mod import;
pub mod init;
pub mod records;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use daftar_lib::daftar_store::{CsvStore, RecordStore, SqliteStore};
use daftar_lib::{ImportProfile, RawRow};

/// Which registry backend to open. Exactly one of --db / --sheet.
#[derive(Args)]
pub struct StoreArgs {
    /// SQLite registry path
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// CSV sheet registry path
    #[arg(long)]
    pub sheet: Option<PathBuf>,
}

impl StoreArgs {
    pub fn open(&self) -> Result<Box<dyn RecordStore>> {
        match (&self.db, &self.sheet) {
            (Some(db), None) => Ok(Box::new(SqliteStore::open(db)?)),
            (None, Some(sheet)) => Ok(Box::new(CsvStore::open(sheet)?)),
            _ => bail!("pass exactly one of --db or --sheet"),
        }
    }
}

pub fn load_profile(path: &Path) -> Result<ImportProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    Ok(ImportProfile::from_toml_str(&raw)?)
}

/// Read an import batch from a CSV file with a header row.
pub fn read_input_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("reading import file {}", path.display()))?;
    let mut rows = Vec::new();
    for row in reader.deserialize::<RawRow>() {
        rows.push(row?);
    }
    Ok(rows)
}
