use tracing::{debug, info, instrument};

use crate::config::{SynonymTable, normalize_column_name};
use crate::model::{CanonicalField, CanonicalRecord, CanonicalTable, RawTable};

/// Maps each column of a header to the canonical field it feeds, if any.
///
/// For every canonical field the columns are scanned left to right and the
/// first one whose normalized name is an accepted synonym wins. Later
/// candidates for the same field stay unmapped, and a column is never claimed
/// by two fields.
pub fn resolve_columns(
    columns: &[String],
    synonyms: &SynonymTable,
) -> Vec<Option<CanonicalField>> {
    let normalized: Vec<String> = columns
        .iter()
        .map(|column| normalize_column_name(column))
        .collect();
    let mut assigned: Vec<Option<CanonicalField>> = vec![None; columns.len()];

    for field in CanonicalField::ALL {
        let hit = normalized
            .iter()
            .enumerate()
            .find(|(idx, name)| assigned[*idx].is_none() && synonyms.accepts(field, name))
            .map(|(idx, _)| idx);
        if let Some(idx) = hit {
            assigned[idx] = Some(field);
        }
    }

    assigned
}

/// Concatenates the raw tables, in order, into one canonical table.
///
/// Column resolution runs per table so that sources using different synonyms
/// for the same field line up. Unmapped columns travel along in
/// [`CanonicalRecord::extra`]. Missing canonical columns simply stay null.
#[instrument(level = "info", skip_all, fields(tables = raw_tables.len()))]
pub fn normalize(raw_tables: &[RawTable], synonyms: &SynonymTable) -> CanonicalTable {
    let total_rows = raw_tables.iter().map(RawTable::len).sum();
    let mut records: CanonicalTable = Vec::with_capacity(total_rows);

    for table in raw_tables {
        let mapping = resolve_columns(&table.columns, synonyms);
        debug!(
            source = table.source.as_deref().unwrap_or("<memory>"),
            mapping = ?describe_mapping(&table.columns, &mapping),
            "resolved canonical columns"
        );

        for row in &table.rows {
            let mut record = CanonicalRecord::default();
            for ((column, field), value) in table.columns.iter().zip(&mapping).zip(row) {
                match field {
                    Some(field) => record.set(*field, value.clone()),
                    None => {
                        record.extra.insert(column.clone(), value.clone());
                    }
                }
            }
            records.push(record);
        }
    }

    info!(rows = records.len(), "combined raw tables");
    records
}

fn describe_mapping(columns: &[String], mapping: &[Option<CanonicalField>]) -> Vec<String> {
    columns
        .iter()
        .zip(mapping)
        .filter_map(|(column, field)| field.map(|field| format!("{column} -> {field}")))
        .collect()
}
