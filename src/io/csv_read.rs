use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::model::{RawTable, ScalarValue};

/// Reads a delimited text export into a raw table. The first record is the
/// header; blank cells become nulls and everything else stays text.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    debug!(path = %path.display(), delimiter = %(delimiter as char), "reading delimited file");
    let table = read_table_from_str(&content, delimiter)?;
    Ok(table.with_source(path.display().to_string()))
}

pub(crate) fn read_table_from_str(content: &str, delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut table = RawTable::new(columns);

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let row = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    ScalarValue::Null
                } else {
                    ScalarValue::String(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Reads a file as UTF-8, falling back to Windows-1252 which many
/// spreadsheet-exported CSVs use for symbols like `£` and `€`.
fn read_file_as_utf8(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let bytes = err.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_SAMPLE_RECORDS: usize = 10;

/// Picks the delimiter whose leading records most often agree with the header
/// width, weighted by that width. `,` is used when no candidate splits the
/// header.
fn sniff_delimiter(content: &str) -> u8 {
    DELIMITER_CANDIDATES
        .into_iter()
        .filter_map(|delimiter| {
            let widths = sample_widths(content, delimiter);
            let (&header, records) = widths.split_first()?;
            let agreeing = records.iter().filter(|&&width| width == header).count();
            (header > 1).then_some((delimiter, (agreeing + 1) * header))
        })
        .fold((b',', 0), |best, candidate| {
            if candidate.1 > best.1 { candidate } else { best }
        })
        .0
}

/// Field counts of the first records, read once with `delimiter`. Stops at
/// the first malformed record.
fn sample_widths(content: &str, delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .take(SNIFF_SAMPLE_RECORDS)
        .map_while(|record| record.ok().map(|record| record.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_text_cells() {
        let table = read_table_from_str(
            "\u{feff}store_id,date,revenue\nS1,2024-01-02,\"$1,200.00\"\nS2,,5\n",
            b',',
        )
        .expect("csv parsed");

        assert_eq!(table.columns, ["store_id", "date", "revenue"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][2], ScalarValue::String("$1,200.00".into()));
        assert!(table.rows[1][1].is_null());
    }

    #[test]
    fn ragged_and_blank_rows() {
        let table = read_table_from_str("a,b,c\n1,2\n,,\n1,2,3,4\n", b',').expect("csv parsed");
        assert_eq!(table.len(), 2);
        assert!(table.rows.iter().all(|row| row.len() == 3));
        assert!(table.rows[0][2].is_null());
    }

    #[test]
    fn semicolon_exports_are_detected() {
        let content = "store;sale_date;amount\nS1;2024-01-02;1,50\nS2;2024-01-03;2,00\n";
        assert_eq!(sniff_delimiter(content), b';');
        assert_eq!(sniff_delimiter("store_id,date\nS1,2024-01-01\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn quoted_delimiters_do_not_sway_the_sniffer() {
        let content = "store|note\nS1|\"a,b,c,d\"\nS2|\"e,f\"\n";
        assert_eq!(sniff_delimiter(content), b'|');
        let tabbed = "store\tamount\nS1\t\"1,5\"\n";
        assert_eq!(sniff_delimiter(tabbed), b'\t');
    }

    #[test]
    fn windows_1252_files_are_decoded() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("legacy.csv");
        fs::write(&path, b"store,product\nS1,Caf\xe9 \x80 card\n").expect("file written");

        let table = read_table(&path).expect("csv read");

        assert_eq!(
            table.rows[0][1],
            ScalarValue::String("Caf\u{e9} \u{20ac} card".into())
        );
        assert_eq!(table.source.as_deref(), Some(path.display().to_string().as_str()));
    }
}
