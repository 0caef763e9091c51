//! In-memory registry backend.

use crate::{Position, Record, RecordStore, StoreError};

/// Vec-backed store for tests and ephemeral runs. Positions are 1-based
/// slot numbers.
pub struct MemoryStore {
    fields: Vec<String>,
    rows: Vec<Record>,
}

impl MemoryStore {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(fields: Vec<String>, rows: Vec<Record>) -> Self {
        Self { fields, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }
}

impl RecordStore for MemoryStore {
    fn field_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.fields.clone())
    }

    fn read_all(&self) -> Result<Vec<(Position, Record)>, StoreError> {
        Ok(self
            .rows
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, record)| (i + 1, record))
            .collect())
    }

    fn append_rows(&mut self, rows: &[Record]) -> Result<(), StoreError> {
        self.rows.extend_from_slice(rows);
        Ok(())
    }

    fn update_rows(&mut self, rows: &[(Position, Record)]) -> Result<(), StoreError> {
        for (position, record) in rows {
            let idx = position
                .checked_sub(1)
                .filter(|i| *i < self.rows.len())
                .ok_or(StoreError::UnknownPosition(*position))?;
            self.rows[idx] = record.clone();
        }
        Ok(())
    }
}
