use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{EtlError, Result};
use crate::model::{RawTable, ScalarValue};

/// Reads the first worksheet of an Excel workbook into a raw table. The first
/// row is the header. Numeric cells keep their type; date cells are rendered
/// as ISO text so the cleaner parses them like any other date.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtlError::InvalidTable {
            path: path.to_path_buf(),
            reason: "workbook has no worksheets".into(),
        })?
        .map_err(EtlError::from)?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(cell_to_header).collect(),
        None => Vec::new(),
    };

    let mut table = RawTable::new(columns).with_source(path.display().to_string());
    for row in rows {
        if row.iter().all(|cell| matches!(cell, DataType::Empty)) {
            continue;
        }
        table.push_row(row.iter().map(cell_to_scalar).collect());
    }

    Ok(table)
}

fn cell_to_header(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_to_scalar(cell: &DataType) -> ScalarValue {
    match cell {
        DataType::String(value) if value.trim().is_empty() => ScalarValue::Null,
        DataType::String(value) => ScalarValue::String(value.clone()),
        DataType::Int(value) => ScalarValue::Integer(*value),
        DataType::Float(value) => ScalarValue::Number(*value),
        DataType::Bool(value) => ScalarValue::String(value.to_string()),
        DataType::DateTime(serial) => match serial_to_datetime(*serial) {
            Some(timestamp) => ScalarValue::String(render_timestamp(timestamp)),
            None => ScalarValue::Null,
        },
        DataType::Error(_) | DataType::Empty => ScalarValue::Null,
        other => ScalarValue::String(other.to_string()),
    }
}

/// Converts an Excel serial day number (1900 date system) to a timestamp.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn render_timestamp(timestamp: NaiveDateTime) -> String {
    if timestamp.time() == chrono::NaiveTime::MIN {
        timestamp.date().format("%Y-%m-%d").to_string()
    } else {
        timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_days_map_to_calendar_dates() {
        let timestamp = serial_to_datetime(45366.0).expect("valid serial");
        assert_eq!(render_timestamp(timestamp), "2024-03-15");

        let timestamp = serial_to_datetime(45366.5).expect("valid serial");
        assert_eq!(render_timestamp(timestamp), "2024-03-15 12:00:00");

        assert_eq!(serial_to_datetime(f64::NAN), None);
        assert_eq!(serial_to_datetime(-1.0), None);
    }

    #[test]
    fn cells_keep_their_kind() {
        assert_eq!(cell_to_scalar(&DataType::Int(3)), ScalarValue::Integer(3));
        assert_eq!(
            cell_to_scalar(&DataType::Float(9.5)),
            ScalarValue::Number(9.5)
        );
        assert_eq!(
            cell_to_scalar(&DataType::String("$5.00".into())),
            ScalarValue::String("$5.00".into())
        );
        assert_eq!(
            cell_to_scalar(&DataType::String("  ".into())),
            ScalarValue::Null
        );
        assert_eq!(cell_to_scalar(&DataType::Empty), ScalarValue::Null);
    }
}
