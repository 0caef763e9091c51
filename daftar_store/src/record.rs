//! The registry record model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A record's storage position. Registry rows carry no intrinsic id;
/// the position assigned by the store is their only handle.
pub type Position = usize;

/// A single registry row: field name to text value.
///
/// Absent fields read as the empty string; the registry does not
/// distinguish a missing column from a blank cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from (field, value) pairs. A repeated field keeps
    /// the last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (field, value) in pairs {
            record.set(field, value);
        }
        record
    }

    /// The value stored under `field`, or `""` when the field is absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Iterate (field, value) pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
