//! SQLite registry backend.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::{Position, Record, RecordStore, StoreError};

/// Durable registry store. Rows live in a `records` table as JSON
/// payloads keyed by an integer position; the field layout and other
/// run metadata live in `registry_meta`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create tables and record the field layout. Safe to call on an
    /// already-initialized registry; an existing layout wins.
    pub fn init(&self, fields: &[String]) -> Result<(), StoreError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS records (
                    position INTEGER PRIMARY KEY AUTOINCREMENT,
                    data TEXT NOT NULL
                 );
                 CREATE TABLE IF NOT EXISTS registry_meta (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                 );",
            )?;
            self.conn.pragma_update(None, "user_version", 1)?;
        }

        if self.get_meta("field_names")?.is_none() {
            self.set_meta("field_names", &serde_json::to_string(fields)?)?;
        }
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                "SELECT value FROM registry_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO registry_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn record_count(&self) -> Result<i64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(1) FROM records", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl RecordStore for SqliteStore {
    fn field_names(&self) -> Result<Vec<String>, StoreError> {
        let Some(raw) = self.get_meta("field_names")? else {
            return Err(StoreError::MissingHeader);
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn read_all(&self) -> Result<Vec<(Position, Record)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT position, data FROM records ORDER BY position")?;
        let rows = stmt.query_map([], |row| {
            let position: i64 = row.get(0)?;
            let data: String = row.get(1)?;
            Ok((position, data))
        })?;

        let mut snapshot = Vec::new();
        for row in rows {
            let (position, data) = row?;
            snapshot.push((position as Position, serde_json::from_str(&data)?));
        }
        Ok(snapshot)
    }

    fn append_rows(&mut self, rows: &[Record]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO records (data) VALUES (?1)")?;
            for row in rows {
                stmt.execute(params![serde_json::to_string(row)?])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn update_rows(&mut self, rows: &[(Position, Record)]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE records SET data = ?1 WHERE position = ?2")?;
            for (position, record) in rows {
                let changed =
                    stmt.execute(params![serde_json::to_string(record)?, *position as i64])?;
                if changed == 0 {
                    return Err(StoreError::UnknownPosition(*position));
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<String> {
        vec!["اسم".to_string(), "شهر".to_string(), "استان".to_string()]
    }

    fn open_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init(&fields()).unwrap();
        store
    }

    #[test]
    fn init_records_field_layout() {
        let store = open_store();
        assert_eq!(store.field_names().unwrap(), fields());
    }

    #[test]
    fn init_is_idempotent_and_keeps_existing_layout() {
        let store = open_store();
        store.init(&["دیگر".to_string()]).unwrap();
        assert_eq!(store.field_names().unwrap(), fields());
    }

    #[test]
    fn append_then_read_roundtrip() {
        let mut store = open_store();
        store
            .append_rows(&[
                Record::from_pairs([("اسم", "رضا احمدی"), ("استان", "البرز")]),
                Record::from_pairs([("اسم", "سارا محمدی")]),
            ])
            .unwrap();

        let snapshot = store.read_all().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].0, 1);
        assert_eq!(snapshot[0].1.get("استان"), "البرز");
        assert_eq!(store.record_count().unwrap(), 2);
    }

    #[test]
    fn update_replaces_row_at_position() {
        let mut store = open_store();
        store
            .append_rows(&[Record::from_pairs([("اسم", "رضا احمدی")])])
            .unwrap();

        let replacement = Record::from_pairs([("اسم", "رضا احمدی"), ("شهر", "کرج")]);
        store.update_rows(&[(1, replacement.clone())]).unwrap();

        let snapshot = store.read_all().unwrap();
        assert_eq!(snapshot[0].1, replacement);
    }

    #[test]
    fn update_unknown_position_errors() {
        let mut store = open_store();
        let err = store.update_rows(&[(42, Record::new())]).unwrap_err();
        assert!(matches!(err, StoreError::UnknownPosition(42)));
    }

    #[test]
    fn meta_upsert_overwrites() {
        let store = open_store();
        store.set_meta("last_import", "2026-01-01").unwrap();
        store.set_meta("last_import", "2026-02-01").unwrap();
        assert_eq!(
            store.get_meta("last_import").unwrap().as_deref(),
            Some("2026-02-01")
        );
    }

    #[test]
    fn missing_layout_errors() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init(&fields()).unwrap();
        store
            .conn
            .execute("DELETE FROM registry_meta WHERE key = 'field_names'", [])
            .unwrap();
        assert!(matches!(
            store.field_names().unwrap_err(),
            StoreError::MissingHeader
        ));
    }
}
