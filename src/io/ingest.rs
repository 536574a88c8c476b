use std::path::{Path, PathBuf};

use tracing::{error, info, instrument};

use crate::error::{EtlError, Result};
use crate::io::{csv_read, excel_read, json_read};
use crate::model::RawTable;

/// File formats the loader knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Excel,
    Json,
}

impl SourceFormat {
    /// Guesses the format from the file extension.
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "txt" | "tsv" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" => Some(SourceFormat::Excel),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

/// A file that could not be turned into a table.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: EtlError,
}

/// Tables that loaded, in request order, plus the files that did not.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub tables: Vec<RawTable>,
    pub failures: Vec<LoadFailure>,
}

/// Reads a single source file.
pub fn load_table(path: &Path) -> Result<RawTable> {
    if !path.exists() {
        return Err(EtlError::MissingInput(path.to_path_buf()));
    }
    match SourceFormat::detect(path) {
        Some(SourceFormat::Csv) => csv_read::read_table(path),
        Some(SourceFormat::Excel) => excel_read::read_table(path),
        Some(SourceFormat::Json) => json_read::read_table(path),
        None => Err(EtlError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Reads every file, logging and collecting failures instead of stopping at
/// the first one.
#[instrument(level = "info", skip_all, fields(files = paths.len()))]
pub fn load_tables<P: AsRef<Path>>(paths: &[P]) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();

    for path in paths {
        let path = path.as_ref();
        match load_table(path) {
            Ok(table) => {
                info!(path = %path.display(), rows = table.len(), "loaded file");
                outcome.tables.push(table);
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load file");
                outcome.failures.push(LoadFailure {
                    path: path.to_path_buf(),
                    error: err,
                });
            }
        }
    }

    info!(
        loaded = outcome.tables.len(),
        failed = outcome.failures.len(),
        "extraction complete"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn format_detection_uses_extension() {
        assert_eq!(
            SourceFormat::detect(Path::new("store1_sales.CSV")),
            Some(SourceFormat::Csv)
        );
        assert_eq!(
            SourceFormat::detect(Path::new("sales.xlsx")),
            Some(SourceFormat::Excel)
        );
        assert_eq!(
            SourceFormat::detect(Path::new("sales.json")),
            Some(SourceFormat::Json)
        );
        assert_eq!(SourceFormat::detect(Path::new("sales.parquet")), None);
        assert_eq!(SourceFormat::detect(Path::new("sales")), None);
    }

    #[test]
    fn failures_do_not_stop_other_files() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let good = dir.path().join("good.csv");
        let unsupported = dir.path().join("notes.md");
        let broken = dir.path().join("broken.json");
        let missing = dir.path().join("missing.csv");
        fs::write(&good, "store_id,revenue\nA,1\n").expect("csv written");
        fs::write(&unsupported, "# notes").expect("md written");
        fs::write(&broken, "{not json").expect("json written");

        let outcome = load_tables(&[&good, &unsupported, &broken, &missing]);

        assert_eq!(outcome.tables.len(), 1);
        assert_eq!(outcome.tables[0].len(), 1);
        assert_eq!(outcome.failures.len(), 3);
        assert!(matches!(
            outcome.failures[0].error,
            EtlError::UnsupportedFormat(_)
        ));
        assert!(matches!(outcome.failures[1].error, EtlError::Json(_)));
        assert!(matches!(outcome.failures[2].error, EtlError::MissingInput(_)));
    }

    #[test]
    fn no_paths_is_an_empty_outcome() {
        let outcome = load_tables::<PathBuf>(&[]);
        assert!(outcome.tables.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
