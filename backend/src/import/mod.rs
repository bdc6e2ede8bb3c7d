//! Spreadsheet-to-document pipeline: workbook bytes in, a batch of solution
//! details out. Any failure aborts the whole import; there is no partial
//! import.

pub mod schema;
pub mod transform;

use crate::error::{AppError, AppResult};
use common::model::solution::SolutionDetail;
use schema::HeaderCell;
use std::io::Cursor;
use umya_spreadsheet::Worksheet;

pub fn parse_workbook(bytes: &[u8]) -> AppResult<Vec<SolutionDetail>> {
    let reader = Cursor::new(bytes.to_vec());
    let book = umya_spreadsheet::reader::xlsx::read_reader(reader, true)
        .map_err(|e| AppError::parse(format!("cannot read workbook: {e}")))?;
    let sheet = book
        .get_sheet(&0)
        .ok_or_else(|| AppError::parse("workbook has no worksheets"))?;

    let highest_row = sheet.get_highest_row();
    if highest_row < 2 {
        return Err(AppError::parse(
            "worksheet needs a header row and at least one data row",
        ));
    }
    let highest_col = sheet.get_highest_column();

    let header: Vec<HeaderCell> = (1..=highest_col)
        .map(|col| HeaderCell {
            text: sheet.get_value((col, 1)),
            fill_argb: fill_of(sheet, col, 1),
        })
        .collect();
    let column_schema = schema::infer_schema(&header)?;

    let rows: Vec<Vec<String>> = (2..=highest_row)
        .map(|row| {
            (1..=highest_col)
                .map(|col| sheet.get_value((col, row)))
                .collect()
        })
        .collect();
    let details = transform::transform_rows(&column_schema, &rows);
    if details.is_empty() {
        return Err(AppError::parse("no data rows parsed from spreadsheet"));
    }
    Ok(details)
}

fn fill_of(sheet: &Worksheet, col: u32, row: u32) -> Option<String> {
    let cell = sheet.get_cell((col, row))?;
    let color = cell.get_style().get_background_color()?;
    let argb = color.get_argb();
    if argb.is_empty() {
        None
    } else {
        Some(argb.to_string())
    }
}
