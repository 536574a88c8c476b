use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Error type covering the failures that can occur around the pipeline:
/// loading source files, reading configuration, and writing reports.
///
/// Bad data inside a file is never an error. It shrinks the cleaned set
/// instead.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a CSV source cannot be read or a CSV report cannot be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors raised by the SQLite summary store.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Raised when a synonym file is not valid TOML or has the wrong shape.
    #[error("synonym file parse error: {0}")]
    SynonymParse(#[from] toml::de::Error),

    /// Raised when a synonym table parses but cannot be used.
    #[error("invalid synonym table: {0}")]
    InvalidSynonyms(String),

    /// Raised when a source file has an extension no reader handles.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Raised when a source file does not follow the tabular conventions.
    #[error("invalid table in {path}: {reason}")]
    InvalidTable { path: PathBuf, reason: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when none of the requested input files could be loaded.
    #[error("no input data could be loaded")]
    NoInputData,

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
