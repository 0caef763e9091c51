//! Operator-supplied import profile: the agreed field layout and the
//! mapping from import columns to registry fields.
//!
//! The layout is fixed at run start so the engine never depends on the
//! column order of whatever sheet an operator happens to upload.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use thiserror::Error;

use daftar_store::Record;

use crate::normalize::normalize;

/// A raw imported row: import column name to raw cell text.
pub type RawRow = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("TOML parse error: {0}")]
    TomlParse(String),
    #[error("profile has an empty field list")]
    EmptyFields,
    #[error("duplicate field in layout: {0}")]
    DuplicateField(String),
    #[error("{role} field '{name}' is not in the field layout")]
    UnknownField { role: &'static str, name: String },
    #[error("identity field '{0}' cannot also be a discriminator")]
    IdentityDiscriminator(String),
}

/// Agreement between the import source and the registry: the ordered
/// field layout, which field carries the identity (name), which fields
/// discriminate between same-name records, and optional renames from
/// import column names to registry field names.
#[derive(Deserialize, Debug, Clone)]
pub struct ImportProfile {
    pub fields: Vec<String>,
    pub identity: String,
    #[serde(default)]
    pub discriminators: Vec<String>,
    /// Import column name -> registry field name. Columns already named
    /// like a registry field pass through without an entry here.
    #[serde(default)]
    pub columns: HashMap<String, String>,
}

impl ImportProfile {
    /// Parse and validate a profile from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ProfileError> {
        let profile: Self =
            toml::from_str(raw).map_err(|e| ProfileError::TomlParse(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.fields.is_empty() {
            return Err(ProfileError::EmptyFields);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.as_str()) {
                return Err(ProfileError::DuplicateField(field.clone()));
            }
        }

        if !self.fields.contains(&self.identity) {
            return Err(ProfileError::UnknownField {
                role: "identity",
                name: self.identity.clone(),
            });
        }

        for discriminator in &self.discriminators {
            if *discriminator == self.identity {
                return Err(ProfileError::IdentityDiscriminator(discriminator.clone()));
            }
            if !self.fields.contains(discriminator) {
                return Err(ProfileError::UnknownField {
                    role: "discriminator",
                    name: discriminator.clone(),
                });
            }
        }

        for target in self.columns.values() {
            if !self.fields.contains(target) {
                return Err(ProfileError::UnknownField {
                    role: "column-mapped",
                    name: target.clone(),
                });
            }
        }

        Ok(())
    }

    /// Map a raw imported row into registry-field space with normalized
    /// values. Unknown columns are dropped; registry fields the row does
    /// not cover stay absent.
    pub fn resolve_row(&self, raw: &RawRow) -> Record {
        let mut record = Record::new();
        for (column, value) in raw {
            let field = self
                .columns
                .get(column)
                .map(String::as_str)
                .unwrap_or(column.as_str());
            if self.fields.iter().any(|f| f == field) {
                record.set(field, normalize(value));
            } else {
                tracing::debug!("dropping unmapped import column '{}'", column);
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ImportProfile {
        ImportProfile::from_toml_str(
            r#"
fields = ["اسم", "شهر", "استان", "سن"]
identity = "اسم"
discriminators = ["شهر", "استان"]

[columns]
name = "اسم"
city = "شهر"
"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_a_full_profile() {
        let p = profile();
        assert_eq!(p.identity, "اسم");
        assert_eq!(p.discriminators, vec!["شهر", "استان"]);
        assert_eq!(p.columns.get("name").unwrap(), "اسم");
    }

    #[test]
    fn identity_must_be_in_layout() {
        let err = ImportProfile::from_toml_str(
            r#"
fields = ["شهر"]
identity = "اسم"
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProfileError::UnknownField {
                role: "identity",
                ..
            }
        ));
    }

    #[test]
    fn discriminator_must_be_in_layout() {
        let err = ImportProfile::from_toml_str(
            r#"
fields = ["اسم"]
identity = "اسم"
discriminators = ["شهر"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::UnknownField { .. }));
    }

    #[test]
    fn identity_cannot_discriminate() {
        let err = ImportProfile::from_toml_str(
            r#"
fields = ["اسم"]
identity = "اسم"
discriminators = ["اسم"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::IdentityDiscriminator(_)));
    }

    #[test]
    fn duplicate_layout_field_rejected() {
        let err = ImportProfile::from_toml_str(
            r#"
fields = ["اسم", "اسم"]
identity = "اسم"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::DuplicateField(_)));
    }

    #[test]
    fn resolve_row_renames_and_normalizes() {
        let p = profile();
        let raw: RawRow = [
            ("name".to_string(), "  علي رضا ".to_string()),
            ("city".to_string(), "nan".to_string()),
            ("استان".to_string(), "تهران".to_string()),
        ]
        .into_iter()
        .collect();

        let record = p.resolve_row(&raw);
        assert_eq!(record.get("اسم"), "علی رضا");
        assert_eq!(record.get("شهر"), "");
        assert_eq!(record.get("استان"), "تهران");
    }

    #[test]
    fn resolve_row_drops_unknown_columns() {
        let p = profile();
        let raw: RawRow = [("یادداشت".to_string(), "متن".to_string())]
            .into_iter()
            .collect();
        let record = p.resolve_row(&raw);
        assert_eq!(record.get("یادداشت"), "");
    }
}
