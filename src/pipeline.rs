use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{error, info, instrument};

use crate::aggregate::aggregate;
use crate::clean::{CleanOutcome, clean};
use crate::config::SynonymTable;
use crate::error::{EtlError, Result};
use crate::io::csv_write::write_summary_csv;
use crate::io::excel_write::write_workbook;
use crate::io::ingest::load_tables;
use crate::io::sqlite::SummaryStore;
use crate::model::{CleanedRecord, MonthlySummaryRecord};
use crate::normalize::normalize;
use crate::report::build_report_workbook;

/// Everything one pipeline run needs. Each run reads its own inputs; nothing
/// is carried over between runs.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub inputs: Vec<PathBuf>,
    /// Directory for CSV/XLSX/JSON reports. `None` skips the export.
    pub output_dir: Option<PathBuf>,
    /// SQLite file to upsert the summary into. `None` skips the load.
    pub database: Option<PathBuf>,
    pub synonyms: SynonymTable,
}

/// What a run produced, for callers and for the closing log lines.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub files_loaded: usize,
    pub files_failed: Vec<PathBuf>,
    pub rows_combined: usize,
    pub rows_removed: usize,
    pub cleaned: Vec<CleanedRecord>,
    pub summary: Vec<MonthlySummaryRecord>,
    pub exports: Vec<PathBuf>,
    pub rows_stored: usize,
}

/// Runs load → normalize → clean → aggregate → store → export, stamping the
/// summary with the current local time.
pub fn run(options: &PipelineOptions) -> Result<PipelineReport> {
    run_at(options, Local::now().naive_local())
}

/// Same as [`run`] with an explicit generation timestamp.
#[instrument(level = "info", skip_all, fields(inputs = options.inputs.len()))]
pub fn run_at(options: &PipelineOptions, now: NaiveDateTime) -> Result<PipelineReport> {
    info!("sales pipeline started");

    let loaded = load_tables(&options.inputs);
    if loaded.tables.is_empty() {
        error!("no data to transform");
        return Err(EtlError::NoInputData);
    }

    let canonical = normalize(&loaded.tables, &options.synonyms);
    let CleanOutcome { records, removed } = clean(&canonical);
    let summary = aggregate(&records, now);

    let rows_stored = match &options.database {
        Some(path) => SummaryStore::open(path)?.upsert(&summary)?,
        None => 0,
    };

    let exports = match &options.output_dir {
        Some(dir) => export_reports(dir, &summary, &records, now)?,
        None => Vec::new(),
    };

    info!(
        clean_rows = records.len(),
        removed,
        groups = summary.len(),
        "sales pipeline completed"
    );

    Ok(PipelineReport {
        files_loaded: loaded.tables.len(),
        files_failed: loaded
            .failures
            .into_iter()
            .map(|failure| failure.path)
            .collect(),
        rows_combined: canonical.len(),
        rows_removed: removed,
        cleaned: records,
        summary,
        exports,
        rows_stored,
    })
}

/// Writes `monthly_sales_summary_<stamp>.{csv,xlsx,json}` into `dir`,
/// creating it if needed. Returns the written paths.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub fn export_reports(
    dir: &Path,
    summary: &[MonthlySummaryRecord],
    cleaned: &[CleanedRecord],
    now: NaiveDateTime,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let stem = format!("monthly_sales_summary_{}", now.format("%Y%m%d_%H%M%S"));

    let csv_path = dir.join(format!("{stem}.csv"));
    write_summary_csv(&csv_path, summary)?;
    info!(path = %csv_path.display(), "CSV report saved");

    let xlsx_path = dir.join(format!("{stem}.xlsx"));
    write_workbook(&xlsx_path, &build_report_workbook(summary, cleaned))?;
    info!(path = %xlsx_path.display(), "Excel report saved");

    let json_path = dir.join(format!("{stem}.json"));
    fs::write(&json_path, serde_json::to_string_pretty(summary)?)?;
    info!(path = %json_path.display(), "JSON report saved");

    Ok(vec![csv_path, xlsx_path, json_path])
}
