use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Table, Workbook};

use crate::error::Result;
use crate::report::{Cell, WorkbookData};

const CURRENCY_FORMAT: &str = "$#,##0.00";

/// Writes the provided workbook data to the given path.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let header_format = Format::new().set_bold();
    let currency_format = Format::new().set_num_format(CURRENCY_FORMAT);

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col_idx as u16, header, &header_format)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let sheet_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let sheet_col = col_idx as u16;
                match cell {
                    Cell::Text(value) => {
                        worksheet.write_string(sheet_row, sheet_col, value)?;
                    }
                    Cell::Integer(value) => {
                        worksheet.write_number(sheet_row, sheet_col, *value as f64)?;
                    }
                    Cell::Currency(value) => {
                        let amount = value.to_f64().unwrap_or_default();
                        worksheet.write_number_with_format(
                            sheet_row,
                            sheet_col,
                            amount,
                            &currency_format,
                        )?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        // A table needs at least one data row.
        if !table.rows.is_empty() && !table.columns.is_empty() {
            let mut excel_table = Table::new();
            excel_table.set_autofilter(true);
            let col_end = (table.columns.len() as u16).saturating_sub(1);
            worksheet.add_table(0, 0, table.rows.len() as u32, col_end, &excel_table)?;
        }

        worksheet.autofit();
    }

    workbook_writer.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use calamine::{DataType, Reader, Xlsx, open_workbook};

    use super::*;
    use crate::report::SheetTable;

    #[test]
    fn written_sheets_read_back() {
        let workbook = WorkbookData {
            tables: vec![
                SheetTable {
                    sheet_name: "Monthly Summary".into(),
                    columns: vec!["store_id".into(), "total_revenue".into()],
                    rows: vec![vec![
                        Cell::Text("S1".into()),
                        Cell::Currency("150.25".parse().unwrap()),
                    ]],
                },
                SheetTable {
                    sheet_name: "Raw Data".into(),
                    columns: vec!["store_id".into(), "quantity".into()],
                    rows: Vec::new(),
                },
            ],
        };
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("report.xlsx");

        write_workbook(&path, &workbook).expect("workbook written");

        let mut reader: Xlsx<_> = open_workbook(&path).expect("workbook opened");
        let range = reader
            .worksheet_range("Monthly Summary")
            .expect("sheet present")
            .expect("sheet read");
        assert_eq!(
            range.get_value((0, 0)),
            Some(&DataType::String("store_id".into()))
        );
        assert_eq!(range.get_value((1, 1)), Some(&DataType::Float(150.25)));
        assert!(reader.worksheet_range("Raw Data").is_some());
    }
}
