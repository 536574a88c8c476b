use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, instrument, warn};

use crate::model::{CleanedRecord, MonthlySummaryRecord};

/// Fractional digits kept on `total_revenue`.
pub const CURRENCY_SCALE: u32 = 2;

#[derive(Debug, Default)]
struct MonthTotals {
    revenue: Decimal,
    quantity: i64,
    orders: u64,
}

/// Rounds a monetary sum half-to-even (banker's rounding) and pins the scale
/// so `10` is reported as `10.00`.
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(CURRENCY_SCALE);
    rounded
}

/// Adds `amount` to a revenue total. A total that would leave the decimal
/// range saturates at its bound instead.
pub fn add_revenue(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        warn!(%total, %amount, "revenue total out of range, saturating");
        total.saturating_add(amount)
    })
}

/// Adds `quantity` to a unit total, saturating at the `i64` bounds.
pub fn add_quantity(total: i64, quantity: i64) -> i64 {
    total.checked_add(quantity).unwrap_or_else(|| {
        warn!(total, quantity, "quantity total out of range, saturating");
        total.saturating_add(quantity)
    })
}

/// Group records by (store_id, year_month) and total revenue, quantity and
/// order count. Output is ordered by store, then month.
///
/// Every row of one run carries the same `now` as its generation timestamp.
#[instrument(level = "info", skip_all, fields(rows = cleaned.len()))]
pub fn aggregate(cleaned: &[CleanedRecord], now: NaiveDateTime) -> Vec<MonthlySummaryRecord> {
    let mut groups: BTreeMap<(&str, &str), MonthTotals> = BTreeMap::new();

    for record in cleaned {
        let totals = groups
            .entry((record.store_id.as_str(), record.year_month.as_str()))
            .or_default();
        totals.revenue = add_revenue(totals.revenue, record.revenue);
        totals.quantity = add_quantity(totals.quantity, record.quantity.unwrap_or(0));
        totals.orders += 1;
    }

    let summary: Vec<MonthlySummaryRecord> = groups
        .into_iter()
        .map(|((store_id, year_month), totals)| MonthlySummaryRecord {
            store_id: store_id.to_string(),
            year_month: year_month.to_string(),
            total_revenue: round_currency(totals.revenue),
            total_quantity: totals.quantity,
            total_orders: totals.orders,
            report_generated: now,
        })
        .collect();

    info!(groups = summary.len(), "built monthly summary");
    summary
}
