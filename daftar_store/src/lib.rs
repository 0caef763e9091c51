//! Record storage for the daftar registry.
//!
//! Defines the `RecordStore` boundary the merge engine writes through,
//! plus three backends: an in-memory store for tests and ephemeral runs,
//! a CSV sheet store (header row + positional data rows), and a SQLite
//! store for durable registries.

mod memory;
mod record;
mod sheet;
mod sqlite;

pub use memory::MemoryStore;
pub use record::{Position, Record};
pub use sheet::CsvStore;
pub use sqlite::SqliteStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store has no field layout")]
    MissingHeader,
    #[error("no stored row at position {0}")]
    UnknownPosition(Position),
}

/// A registry backend: an ordered collection of positioned rows sharing
/// one agreed field layout.
///
/// Reads return a full snapshot; writes come in two batch shapes, an
/// ordered append and a positional replace. A backend may fail a batch
/// entirely, but positions handed out by `read_all` stay valid until the
/// next successful write.
pub trait RecordStore {
    /// The ordered field layout of this registry.
    fn field_names(&self) -> Result<Vec<String>, StoreError>;

    /// Read the full snapshot in storage order, with positions.
    fn read_all(&self) -> Result<Vec<(Position, Record)>, StoreError>;

    /// Append rows at the end of the registry, preserving their order.
    fn append_rows(&mut self, rows: &[Record]) -> Result<(), StoreError>;

    /// Replace whole rows at the given positions.
    fn update_rows(&mut self, rows: &[(Position, Record)]) -> Result<(), StoreError>;
}
