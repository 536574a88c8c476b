//! Adapters around the core: reading source files and writing reports.

pub mod csv_read;
pub mod csv_write;
pub mod excel_read;
pub mod excel_write;
pub mod ingest;
pub mod json_read;
pub mod sqlite;
