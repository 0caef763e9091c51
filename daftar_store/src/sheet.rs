//! CSV sheet backend: a header row plus positional data rows.
//!
//! Positions are physical row numbers as an operator would see them in a
//! spreadsheet: the header is row 1, the first data row is row 2.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::{Position, Record, RecordStore, StoreError};

/// Physical row number of the first data row.
pub const FIRST_DATA_ROW: Position = 2;

/// File-backed sheet store. Appends append to the file; positional
/// updates rewrite it, since CSV rows are not fixed-width.
pub struct CsvStore {
    path: PathBuf,
    fields: Vec<String>,
}

impl CsvStore {
    /// Open an existing sheet, reading the field layout from its header row.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        if headers.iter().all(str::is_empty) {
            return Err(StoreError::MissingHeader);
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            fields: headers.iter().map(str::to_string).collect(),
        })
    }

    /// Create a new sheet holding only a header row.
    pub fn create(path: impl AsRef<Path>, fields: &[String]) -> Result<Self, StoreError> {
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(fields)?;
        writer.flush()?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            fields: fields.to_vec(),
        })
    }

    fn row_values(&self, record: &Record) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| record.get(field).to_string())
            .collect()
    }
}

impl RecordStore for CsvStore {
    fn field_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.fields.clone())
    }

    fn read_all(&self) -> Result<Vec<(Position, Record)>, StoreError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut snapshot = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row?;
            let mut record = Record::new();
            for (field, value) in self.fields.iter().zip(row.iter()) {
                record.set(field, value);
            }
            snapshot.push((i + FIRST_DATA_ROW, record));
        }
        Ok(snapshot)
    }

    fn append_rows(&mut self, rows: &[Record]) -> Result<(), StoreError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for row in rows {
            writer.write_record(self.row_values(row))?;
        }
        writer.flush()?;
        Ok(())
    }

    fn update_rows(&mut self, rows: &[(Position, Record)]) -> Result<(), StoreError> {
        let mut snapshot = self.read_all()?;
        for (position, record) in rows {
            let idx = position
                .checked_sub(FIRST_DATA_ROW)
                .filter(|i| *i < snapshot.len())
                .ok_or(StoreError::UnknownPosition(*position))?;
            snapshot[idx].1 = record.clone();
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(&self.fields)?;
        for (_, record) in &snapshot {
            writer.write_record(self.row_values(record))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<String> {
        vec!["اسم".to_string(), "شهر".to_string(), "استان".to_string()]
    }

    #[test]
    fn create_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.csv");
        CsvStore::create(&path, &fields()).unwrap();

        let store = CsvStore::open(&path).unwrap();
        assert_eq!(store.field_names().unwrap(), fields());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn append_then_read_positions_start_at_two() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.csv");
        let mut store = CsvStore::create(&path, &fields()).unwrap();

        store
            .append_rows(&[
                Record::from_pairs([("اسم", "رضا احمدی"), ("استان", "البرز")]),
                Record::from_pairs([("اسم", "سارا محمدی"), ("شهر", "تهران")]),
            ])
            .unwrap();

        let snapshot = store.read_all().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].0, 2);
        assert_eq!(snapshot[0].1.get("اسم"), "رضا احمدی");
        assert_eq!(snapshot[1].0, 3);
        assert_eq!(snapshot[1].1.get("شهر"), "تهران");
    }

    #[test]
    fn update_rewrites_row_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.csv");
        let mut store = CsvStore::create(&path, &fields()).unwrap();
        store
            .append_rows(&[
                Record::from_pairs([("اسم", "رضا احمدی")]),
                Record::from_pairs([("اسم", "سارا محمدی")]),
            ])
            .unwrap();

        let replacement = Record::from_pairs([("اسم", "رضا احمدی"), ("شهر", "کرج")]);
        store.update_rows(&[(2, replacement)]).unwrap();

        let snapshot = store.read_all().unwrap();
        assert_eq!(snapshot[0].1.get("شهر"), "کرج");
        assert_eq!(snapshot[1].1.get("اسم"), "سارا محمدی");
    }

    #[test]
    fn update_unknown_position_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.csv");
        let mut store = CsvStore::create(&path, &fields()).unwrap();
        let err = store.update_rows(&[(9, Record::new())]).unwrap_err();
        assert!(matches!(err, StoreError::UnknownPosition(9)));
    }

    #[test]
    fn append_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.csv");
        {
            let mut store = CsvStore::create(&path, &fields()).unwrap();
            store
                .append_rows(&[Record::from_pairs([("اسم", "رضا احمدی")])])
                .unwrap();
        }
        let store = CsvStore::open(&path).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 1);
    }
}
