use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{EtlError, Result};
use crate::model::{RawTable, ScalarValue};

/// Reads a JSON array of flat objects. Columns appear in the order keys are
/// first seen; objects lacking a key get a null for it.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let source = fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&source)?;
    table_from_json(json)
        .map(|table| table.with_source(path.display().to_string()))
        .map_err(|reason| EtlError::InvalidTable {
            path: path.to_path_buf(),
            reason,
        })
}

fn table_from_json(json: Value) -> std::result::Result<RawTable, String> {
    let Value::Array(items) = json else {
        return Err("expected a top-level array of objects".into());
    };

    let mut objects = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(object) => objects.push(object),
            _ => return Err(format!("element {idx} is not an object")),
        }
    }

    let mut columns: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = RawTable::new(columns.clone());
    for mut object in objects {
        let row = columns
            .iter()
            .map(|column| {
                object
                    .remove(column)
                    .map(ScalarValue::from_json)
                    .unwrap_or(ScalarValue::Null)
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}
