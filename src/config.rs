use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{EtlError, Result};
use crate::model::CanonicalField;

const DEFAULT_SYNONYMS: [(CanonicalField, &[&str]); 5] = [
    (CanonicalField::StoreId, &["store_id", "store", "location_id"]),
    (CanonicalField::Date, &["date", "sale_date", "transaction_date"]),
    (CanonicalField::Revenue, &["revenue", "sales", "amount", "total"]),
    (CanonicalField::Product, &["product", "product_name", "item"]),
    (CanonicalField::Quantity, &["quantity", "qty", "units"]),
];

/// Case-folds and trims a column name the same way for headers and synonyms.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Declarative mapping from canonical field to the source column names that
/// are accepted for it.
///
/// The built-in table covers the export formats seen so far. A TOML file can
/// replace the list for any field:
///
/// ```toml
/// [synonyms]
/// store_id = ["store_id", "shop", "branch"]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SynonymTable {
    entries: BTreeMap<CanonicalField, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SynonymFile {
    #[serde(default)]
    synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        let entries = DEFAULT_SYNONYMS
            .iter()
            .map(|(field, names)| {
                let names = names.iter().map(|name| name.to_string()).collect();
                (*field, names)
            })
            .collect();
        Self { entries }
    }
}

impl SynonymTable {
    /// Accepted names for `field`, already normalized, in priority order.
    pub fn synonyms(&self, field: CanonicalField) -> &[String] {
        self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a normalized column name is accepted for `field`.
    pub fn accepts(&self, field: CanonicalField, normalized_name: &str) -> bool {
        self.synonyms(field)
            .iter()
            .any(|candidate| candidate == normalized_name)
    }

    /// Replaces the accepted names for one field.
    pub fn with_synonyms<I, S>(mut self, field: CanonicalField, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for name in names {
            let name = normalize_column_name(name.as_ref());
            if !name.is_empty() && !normalized.contains(&name) {
                normalized.push(name);
            }
        }
        if normalized.is_empty() {
            return Err(EtlError::InvalidSynonyms(format!(
                "no column names given for '{field}'"
            )));
        }
        self.entries.insert(field, normalized);
        Ok(self)
    }

    /// Parses a TOML synonym file on top of the default table.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: SynonymFile = toml::from_str(source)?;
        let mut table = Self::default();
        for (key, names) in file.synonyms {
            let field = CanonicalField::ALL
                .into_iter()
                .find(|field| field.as_str() == normalize_column_name(&key))
                .ok_or_else(|| {
                    EtlError::InvalidSynonyms(format!("unknown canonical field '{key}'"))
                })?;
            table = table.with_synonyms(field, names)?;
        }
        Ok(table)
    }

    /// Loads a TOML synonym file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EtlError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let table = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), "loaded synonym table");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_lists_every_field() {
        let table = SynonymTable::default();
        for field in CanonicalField::ALL {
            assert!(table.accepts(field, field.as_str()), "{field}");
        }
        assert!(table.accepts(CanonicalField::Revenue, "total"));
        assert!(!table.accepts(CanonicalField::Revenue, "qty"));
    }

    #[test]
    fn toml_replaces_only_listed_fields() {
        let table = SynonymTable::from_toml_str(
            r#"
            [synonyms]
            store_id = [" Shop ", "BRANCH", "shop"]
            "#,
        )
        .expect("synonyms parsed");

        assert_eq!(table.synonyms(CanonicalField::StoreId), ["shop", "branch"]);
        assert!(!table.accepts(CanonicalField::StoreId, "store"));
        assert!(table.accepts(CanonicalField::Quantity, "qty"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = SynonymTable::from_toml_str("[synonyms]\ncurrency = [\"ccy\"]\n")
            .expect_err("unknown field");
        assert!(matches!(err, EtlError::InvalidSynonyms(_)));
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = SynonymTable::from_toml_str("[synonyms]\ndate = [\"  \"]\n")
            .expect_err("empty list");
        assert!(matches!(err, EtlError::InvalidSynonyms(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SynonymTable::from_toml_str("[synonyms\n").expect_err("bad toml");
        assert!(matches!(err, EtlError::SynonymParse(_)));
    }
}
