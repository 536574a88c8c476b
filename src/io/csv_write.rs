use std::path::Path;

use crate::error::Result;
use crate::model::MonthlySummaryRecord;
use crate::report::TIMESTAMP_FORMAT;

const SUMMARY_HEADER: [&str; 6] = [
    "store_id",
    "year_month",
    "total_revenue",
    "total_quantity",
    "total_orders",
    "report_generated",
];

/// Writes the monthly summary as a CSV file with a header row.
pub fn write_summary_csv(path: &Path, summary: &[MonthlySummaryRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SUMMARY_HEADER)?;

    for row in summary {
        writer.write_record([
            row.store_id.clone(),
            row.year_month.clone(),
            row.total_revenue.to_string(),
            row.total_quantity.to_string(),
            row.total_orders.to_string(),
            row.report_generated.format(TIMESTAMP_FORMAT).to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn summary_rows_are_written_with_header() {
        let generated = NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(6, 5, 4)
            .unwrap();
        let summary = vec![MonthlySummaryRecord {
            store_id: "STORE, 1".into(),
            year_month: "2024-03".into(),
            total_revenue: Decimal::new(123450, 2),
            total_quantity: 7,
            total_orders: 3,
            report_generated: generated,
        }];
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("summary.csv");

        write_summary_csv(&path, &summary).expect("csv written");

        let written = fs::read_to_string(&path).expect("csv read");
        assert_eq!(
            written,
            "store_id,year_month,total_revenue,total_quantity,total_orders,report_generated\n\
             \"STORE, 1\",2024-03,1234.50,7,3,2024-04-01 06:05:04\n"
        );
    }
}
