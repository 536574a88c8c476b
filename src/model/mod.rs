use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

/// Represents an untyped cell as it arrives from an ingested file.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScalarValue {
    /// Text exactly as read from the source.
    String(String),
    /// Whole number literal.
    Integer(i64),
    /// Floating point number literal.
    Number(f64),
    /// Missing cell.
    #[default]
    Null,
}

impl ScalarValue {
    /// Converts a JSON value into a scalar. Booleans and nested structures
    /// are kept as their JSON text so nothing is silently lost.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ScalarValue::Null,
            serde_json::Value::String(value) => ScalarValue::String(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => ScalarValue::Integer(value),
                None => number
                    .as_f64()
                    .map(ScalarValue::Number)
                    .unwrap_or(ScalarValue::Null),
            },
            other => ScalarValue::String(other.to_string()),
        }
    }

    /// Renders the scalar as trimmed text, or `None` for nulls and blank strings.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ScalarValue::String(value) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            ScalarValue::Integer(value) => Some(value.to_string()),
            ScalarValue::Number(value) if value.is_finite() => Some(value.to_string()),
            ScalarValue::Number(_) | ScalarValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

/// A single row of a raw table, aligned with the table's columns.
pub type RawRecord = Vec<ScalarValue>;

/// A table as produced by ingestion: ordered column names and untyped rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Where the table came from, usually a file path. Only used in logs.
    pub source: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    /// Creates an empty table with the given header.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: None,
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Labels the table with the location it was read from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Appends a row. Short rows are padded with nulls and long rows are
    /// truncated so every row lines up with the header.
    pub fn push_row(&mut self, mut row: RawRecord) {
        row.resize(self.columns.len(), ScalarValue::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The fixed set of fields every downstream stage depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    StoreId,
    Date,
    Revenue,
    Product,
    Quantity,
}

impl CanonicalField {
    /// All canonical fields in schema order.
    pub const ALL: [CanonicalField; 5] = [
        CanonicalField::StoreId,
        CanonicalField::Date,
        CanonicalField::Revenue,
        CanonicalField::Product,
        CanonicalField::Quantity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::StoreId => "store_id",
            CanonicalField::Date => "date",
            CanonicalField::Revenue => "revenue",
            CanonicalField::Product => "product",
            CanonicalField::Quantity => "quantity",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row after schema normalization. Canonical fields are still untyped;
/// they are `Null` when the source table had no column for them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRecord {
    pub store_id: ScalarValue,
    pub date: ScalarValue,
    pub revenue: ScalarValue,
    pub product: ScalarValue,
    pub quantity: ScalarValue,
    /// Columns that matched no synonym, keyed by their source column name.
    pub extra: BTreeMap<String, ScalarValue>,
}

impl CanonicalRecord {
    pub fn get(&self, field: CanonicalField) -> &ScalarValue {
        match field {
            CanonicalField::StoreId => &self.store_id,
            CanonicalField::Date => &self.date,
            CanonicalField::Revenue => &self.revenue,
            CanonicalField::Product => &self.product,
            CanonicalField::Quantity => &self.quantity,
        }
    }

    pub fn set(&mut self, field: CanonicalField, value: ScalarValue) {
        let slot = match field {
            CanonicalField::StoreId => &mut self.store_id,
            CanonicalField::Date => &mut self.date,
            CanonicalField::Revenue => &mut self.revenue,
            CanonicalField::Product => &mut self.product,
            CanonicalField::Quantity => &mut self.quantity,
        };
        *slot = value;
    }
}

/// Output of the schema normalizer.
pub type CanonicalTable = Vec<CanonicalRecord>;

/// A typed, validated row ready for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub store_id: String,
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub product: Option<String>,
    pub quantity: Option<i64>,
    pub year: i32,
    /// Calendar month, 1 through 12.
    pub month: u32,
    /// `YYYY-MM`.
    pub year_month: String,
}

/// One row of the monthly rollup, unique per `(store_id, year_month)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummaryRecord {
    pub store_id: String,
    pub year_month: String,
    /// Rounded half-to-even at two decimal places, scale fixed at 2.
    pub total_revenue: Decimal,
    pub total_quantity: i64,
    pub total_orders: u64,
    pub report_generated: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_row_aligns_with_header() {
        let mut table = RawTable::new(["a", "b", "c"]);
        table.push_row(vec![ScalarValue::Integer(1)]);
        table.push_row(vec![
            ScalarValue::Integer(1),
            ScalarValue::Integer(2),
            ScalarValue::Integer(3),
            ScalarValue::Integer(4),
        ]);

        assert_eq!(table.rows[0].len(), 3);
        assert!(table.rows[0][2].is_null());
        assert_eq!(table.rows[1].len(), 3);
    }

    #[test]
    fn json_scalars_keep_numeric_kind() {
        assert_eq!(
            ScalarValue::from_json(serde_json::json!(42)),
            ScalarValue::Integer(42)
        );
        assert_eq!(
            ScalarValue::from_json(serde_json::json!(4.5)),
            ScalarValue::Number(4.5)
        );
        assert_eq!(
            ScalarValue::from_json(serde_json::json!(true)),
            ScalarValue::String("true".into())
        );
        assert!(ScalarValue::from_json(serde_json::Value::Null).is_null());
    }

    #[test]
    fn text_rendering_skips_blanks() {
        assert_eq!(ScalarValue::String("  ".into()).as_text(), None);
        assert_eq!(
            ScalarValue::String(" S1 ".into()).as_text(),
            Some("S1".to_string())
        );
        assert_eq!(ScalarValue::Integer(7).as_text(), Some("7".to_string()));
        assert_eq!(ScalarValue::Number(7.0).as_text(), Some("7".to_string()));
        assert_eq!(ScalarValue::Number(f64::NAN).as_text(), None);
    }
}
