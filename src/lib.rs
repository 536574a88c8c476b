//! Core library for the sales-etl command line application.
//!
//! Point-of-sale exports arrive with different column names, date layouts and
//! currency formatting. The library turns them into one canonical data set and
//! a per-store monthly rollup in three pure stages:
//!
//! 1. [`normalize`] maps source columns onto the canonical schema using a
//!    [`SynonymTable`].
//! 2. [`clean`] coerces values, drops rows without a usable date, revenue or
//!    store id, and derives calendar fields.
//! 3. [`aggregate`] totals revenue, quantity and orders per store and month.
//!
//! File adapters live under [`io`], report layout in [`report`], and the
//! end-to-end orchestration used by the binary in [`pipeline`].

pub mod aggregate;
pub mod clean;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod report;

pub use aggregate::aggregate;
pub use clean::{CleanOutcome, clean};
pub use config::SynonymTable;
pub use error::{EtlError, Result};
pub use normalize::normalize;
