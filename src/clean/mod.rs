pub mod coerce;

use chrono::Datelike;
use tracing::{info, instrument, trace, warn};

use crate::model::{CanonicalRecord, CleanedRecord};

use self::coerce::{coerce_date, coerce_quantity, coerce_revenue, coerce_text};

/// Result of a cleaning pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanOutcome {
    /// Rows that survived coercion, in input order.
    pub records: Vec<CleanedRecord>,
    /// Rows dropped because `date`, `revenue` or `store_id` was unusable.
    pub removed: usize,
}

/// Coerces every canonical row and keeps the ones with a usable date,
/// revenue and store id.
#[instrument(level = "info", skip_all, fields(rows = canonical.len()))]
pub fn clean(canonical: &[CanonicalRecord]) -> CleanOutcome {
    let records: Vec<CleanedRecord> = canonical.iter().filter_map(clean_record).collect();
    let removed = canonical.len() - records.len();

    info!(removed, kept = records.len(), "removed invalid rows");
    if records.is_empty() && removed > 0 {
        warn!(removed, "no row passed validation");
    }

    CleanOutcome { records, removed }
}

/// Cleans a single row, or returns `None` when a required field is missing.
pub fn clean_record(record: &CanonicalRecord) -> Option<CleanedRecord> {
    let date = coerce_date(&record.date);
    let revenue = coerce_revenue(&record.revenue);
    let store_id = coerce_text(&record.store_id);

    let (Some(date), Some(revenue), Some(store_id)) = (date, revenue, store_id.as_ref()) else {
        trace!(
            has_date = date.is_some(),
            has_revenue = revenue.is_some(),
            has_store = store_id.is_some(),
            "dropping row"
        );
        return None;
    };

    let year = date.year();
    let month = date.month();
    Some(CleanedRecord {
        store_id: store_id.clone(),
        date,
        revenue,
        product: coerce_text(&record.product),
        quantity: coerce_quantity(&record.quantity),
        year,
        month,
        year_month: format!("{year:04}-{month:02}"),
    })
}
