use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::error::Result;
use crate::model::MonthlySummaryRecord;
use crate::report::TIMESTAMP_FORMAT;

// Revenue is stored as text so the exact two-decimal value survives.
const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS monthly_summary (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    store_id TEXT NOT NULL,
    year_month TEXT NOT NULL,
    total_revenue TEXT NOT NULL,
    total_quantity INTEGER NOT NULL,
    total_orders INTEGER NOT NULL,
    report_generated TEXT NOT NULL,
    UNIQUE(store_id, year_month)
);
";

const UPSERT: &str = "
INSERT INTO monthly_summary
    (store_id, year_month, total_revenue, total_quantity, total_orders, report_generated)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT(store_id, year_month) DO UPDATE SET
    total_revenue = excluded.total_revenue,
    total_quantity = excluded.total_quantity,
    total_orders = excluded.total_orders,
    report_generated = excluded.report_generated
";

const SELECT_ALL: &str = "
SELECT store_id, year_month, total_revenue, total_quantity, total_orders, report_generated
FROM monthly_summary
ORDER BY store_id, year_month
";

/// SQLite-backed store for monthly summaries. Loading the same store and
/// month twice replaces the earlier figures.
pub struct SummaryStore {
    conn: Connection,
}

impl SummaryStore {
    /// Opens (or creates) the database file and ensures the table exists.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self { conn })
    }

    /// Inserts or replaces the given rows in one transaction. Returns the
    /// number of rows written.
    #[instrument(level = "info", skip_all, fields(rows = summary.len()))]
    pub fn upsert(&mut self, summary: &[MonthlySummaryRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut statement = tx.prepare(UPSERT)?;
            for row in summary {
                statement.execute(params![
                    row.store_id,
                    row.year_month,
                    row.total_revenue.to_string(),
                    row.total_quantity,
                    row.total_orders as i64,
                    row.report_generated.format(TIMESTAMP_FORMAT).to_string(),
                ])?;
            }
        }
        tx.commit()?;
        info!(rows = summary.len(), "database load complete");
        Ok(summary.len())
    }

    /// Reads every stored row, ordered by store and month.
    pub fn load_all(&self) -> Result<Vec<MonthlySummaryRecord>> {
        let mut statement = self.conn.prepare(SELECT_ALL)?;
        let rows = statement.query_map([], |row| {
            let revenue: String = row.get(2)?;
            let generated: String = row.get(5)?;
            let total_orders: i64 = row.get(4)?;
            Ok(MonthlySummaryRecord {
                store_id: row.get(0)?,
                year_month: row.get(1)?,
                total_revenue: Decimal::from_str(&revenue).map_err(|err| {
                    rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(err))
                })?,
                total_quantity: row.get(3)?,
                total_orders: total_orders.max(0) as u64,
                report_generated: NaiveDateTime::parse_from_str(&generated, TIMESTAMP_FORMAT)
                    .map_err(|err| {
                        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(err))
                    })?,
            })
        })?;

        let mut summary = Vec::new();
        for row in rows {
            summary.push(row?);
        }
        Ok(summary)
    }
}
