use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::aggregate::{add_quantity, add_revenue, round_currency};
use crate::model::{CleanedRecord, MonthlySummaryRecord};

/// Sheet holding one row per store and month.
pub const SUMMARY_SHEET: &str = "Monthly Summary";
/// Sheet holding every cleaned record.
pub const RAW_DATA_SHEET: &str = "Raw Data";
/// Sheet holding the headline metrics.
pub const OVERVIEW_SHEET: &str = "Overview";

/// Timestamp layout used in every report artefact.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A typed cell in a report sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Currency(Decimal),
    Empty,
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Represents all tables required to materialise the report workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// Lays out the summary, the cleaned records and the overview as sheets.
pub fn build_report_workbook(
    summary: &[MonthlySummaryRecord],
    cleaned: &[CleanedRecord],
) -> WorkbookData {
    let mut tables = vec![summary_table(summary), raw_data_table(cleaned)];
    if let Some(overview) = Overview::from_records(cleaned) {
        tables.push(overview.into_table());
    }
    WorkbookData { tables }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn summary_table(summary: &[MonthlySummaryRecord]) -> SheetTable {
    let rows = summary
        .iter()
        .map(|row| {
            vec![
                Cell::Text(row.store_id.clone()),
                Cell::Text(row.year_month.clone()),
                Cell::Currency(row.total_revenue),
                Cell::Integer(row.total_quantity),
                Cell::Integer(row.total_orders as i64),
                Cell::Text(row.report_generated.format(TIMESTAMP_FORMAT).to_string()),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: SUMMARY_SHEET.to_string(),
        columns: columns(&[
            "store_id",
            "year_month",
            "total_revenue",
            "total_quantity",
            "total_orders",
            "report_generated",
        ]),
        rows,
    }
}

fn raw_data_table(cleaned: &[CleanedRecord]) -> SheetTable {
    let rows = cleaned
        .iter()
        .map(|record| {
            vec![
                Cell::Text(record.store_id.clone()),
                Cell::Text(record.date.to_string()),
                Cell::Currency(record.revenue),
                record
                    .product
                    .clone()
                    .map(Cell::Text)
                    .unwrap_or(Cell::Empty),
                record.quantity.map(Cell::Integer).unwrap_or(Cell::Empty),
                Cell::Integer(i64::from(record.year)),
                Cell::Integer(i64::from(record.month)),
                Cell::Text(record.year_month.clone()),
            ]
        })
        .collect();

    SheetTable {
        sheet_name: RAW_DATA_SHEET.to_string(),
        columns: columns(&[
            "store_id",
            "date",
            "revenue",
            "product",
            "quantity",
            "year",
            "month",
            "year_month",
        ]),
        rows,
    }
}

/// Headline figures for a cleaned data set, shown on the report's overview sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub total_revenue: Decimal,
    pub total_orders: usize,
    pub total_quantity: i64,
    pub store_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl Overview {
    /// Returns `None` when there is nothing to summarise.
    pub fn from_records(records: &[CleanedRecord]) -> Option<Self> {
        let first = records.first()?;
        let mut first_date = first.date;
        let mut last_date = first.date;
        let mut total_revenue = Decimal::ZERO;
        let mut total_quantity = 0i64;
        let mut stores = BTreeSet::new();

        for record in records {
            total_revenue = add_revenue(total_revenue, record.revenue);
            total_quantity = add_quantity(total_quantity, record.quantity.unwrap_or(0));
            stores.insert(record.store_id.as_str());
            first_date = first_date.min(record.date);
            last_date = last_date.max(record.date);
        }

        Some(Self {
            total_revenue: round_currency(total_revenue),
            total_orders: records.len(),
            total_quantity,
            store_count: stores.len(),
            first_date,
            last_date,
        })
    }

    /// Metric/value pairs in display order.
    pub fn metrics(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Revenue", format_currency(self.total_revenue)),
            ("Total Orders", group_thousands(&self.total_orders.to_string())),
            ("Total Quantity", group_thousands(&self.total_quantity.to_string())),
            ("Number of Stores", self.store_count.to_string()),
            (
                "Date Range",
                format!("{} to {}", self.first_date, self.last_date),
            ),
        ]
    }

    fn into_table(self) -> SheetTable {
        let rows = self
            .metrics()
            .into_iter()
            .map(|(metric, value)| vec![Cell::Text(metric.to_string()), Cell::Text(value)])
            .collect();
        SheetTable {
            sheet_name: OVERVIEW_SHEET.to_string(),
            columns: columns(&["Metric", "Value"]),
            rows,
        }
    }
}

/// Formats an amount as `$1,234.56` (negative amounts as `-$1,234.56`).
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_currency(amount);
    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${}.{fraction}", group_thousands(whole))
}

/// Inserts `,` between groups of three digits in an integer string.
pub fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Datelike;

    use super::*;

    fn record(store: &str, date: &str, revenue: &str, quantity: Option<i64>) -> CleanedRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        CleanedRecord {
            store_id: store.into(),
            date,
            revenue: Decimal::from_str(revenue).unwrap(),
            product: None,
            quantity,
            year: date.year(),
            month: date.month(),
            year_month: format!("{:04}-{:02}", date.year(), date.month()),
        }
    }

    #[test]
    fn overview_covers_all_records() {
        let rows = vec![
            record("B", "2024-02-10", "1000.5", Some(3)),
            record("A", "2024-01-02", "234", None),
            record("B", "2024-03-31", "0.25", Some(1200)),
        ];

        let overview = Overview::from_records(&rows).expect("non-empty input");

        assert_eq!(overview.total_revenue.to_string(), "1234.75");
        assert_eq!(overview.total_orders, 3);
        assert_eq!(overview.total_quantity, 1203);
        assert_eq!(overview.store_count, 2);
        assert_eq!(overview.first_date.to_string(), "2024-01-02");
        assert_eq!(overview.last_date.to_string(), "2024-03-31");

        let metrics = overview.metrics();
        assert_eq!(metrics[0], ("Total Revenue", "$1,234.75".to_string()));
        assert_eq!(metrics[2], ("Total Quantity", "1,203".to_string()));
        assert_eq!(
            metrics[4],
            ("Date Range", "2024-01-02 to 2024-03-31".to_string())
        );
    }

    #[test]
    fn overview_totals_saturate_on_extreme_values() {
        let rows = vec![
            record("A", "2024-01-02", "79228162514264337593543950335", Some(i64::MAX)),
            record("B", "2024-01-03", "1", Some(1)),
        ];

        let overview = Overview::from_records(&rows).expect("non-empty input");

        assert_eq!(overview.total_revenue, Decimal::MAX);
        assert_eq!(overview.total_quantity, i64::MAX);
        assert_eq!(overview.metrics().len(), 5);
    }

    #[test]
    fn overview_of_nothing_is_none() {
        assert_eq!(Overview::from_records(&[]), None);
    }

    #[test]
    fn workbook_has_one_sheet_per_view() {
        let rows = vec![
            record("A", "2024-01-02", "10.5", Some(1)),
            record("A", "2024-01-09", "4.5", None),
        ];
        let now = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let summary = crate::aggregate::aggregate(&rows, now);

        let workbook = build_report_workbook(&summary, &rows);

        let names: Vec<_> = workbook
            .tables
            .iter()
            .map(|table| table.sheet_name.as_str())
            .collect();
        assert_eq!(names, [SUMMARY_SHEET, RAW_DATA_SHEET, OVERVIEW_SHEET]);
        assert_eq!(
            workbook.tables[0].rows[0],
            vec![
                Cell::Text("A".into()),
                Cell::Text("2024-01".into()),
                Cell::Currency(Decimal::from_str("15.00").unwrap()),
                Cell::Integer(1),
                Cell::Integer(2),
                Cell::Text("2024-02-01 09:00:00".into()),
            ]
        );
        assert_eq!(workbook.tables[1].rows.len(), 2);
        assert_eq!(workbook.tables[1].rows[1][4], Cell::Empty);
        assert_eq!(workbook.tables[2].rows.len(), 5);
    }

    #[test]
    fn empty_workbook_skips_overview() {
        let workbook = build_report_workbook(&[], &[]);
        assert_eq!(workbook.tables.len(), 2);
        assert!(workbook.tables.iter().all(|table| table.rows.is_empty()));
    }

    #[test]
    fn currency_formatting() {
        let amount = |text: &str| Decimal::from_str(text).unwrap();
        assert_eq!(format_currency(amount("0")), "$0.00");
        assert_eq!(format_currency(amount("999.999")), "$1,000.00");
        assert_eq!(format_currency(amount("1234567.8")), "$1,234,567.80");
        assert_eq!(format_currency(amount("-42.5")), "-$42.50");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("-1234567"), "-1,234,567");
    }
}
