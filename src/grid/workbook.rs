use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::Workbook;
use tracing::warn;

use super::{Grid, GridFormat};
use crate::text::CellValue;

const SHEET_NAME: &str = "Sheet1";

/// Reads the first worksheet. Numbers without a fractional part come back
/// as integers, the way they were typed into the sheet.
pub(super) fn read_first_sheet(path: &Path) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook: {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("workbook has no worksheets: {}", path.display()))?
        .with_context(|| format!("failed to read first worksheet: {}", path.display()))?;

    let mut grid = Grid::new();
    let Some((first_row, first_col)) = range.start() else {
        return Ok(grid);
    };

    for (row_offset, cells) in range.rows().enumerate() {
        let row = first_row as usize + row_offset + 1;
        for (col_offset, data) in cells.iter().enumerate() {
            let col = first_col as usize + col_offset + 1;
            let value = match data {
                Data::Empty => continue,
                Data::String(text) => CellValue::from_raw(text),
                Data::Int(value) => CellValue::Integer(*value),
                Data::Float(value) => float_cell(*value),
                Data::Bool(value) => CellValue::Text(value.to_string()),
                Data::DateTime(value) => float_cell(value.as_f64()),
                Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::from_raw(text),
                Data::Error(err) => {
                    warn!(
                        path = %path.display(),
                        row,
                        column = col,
                        error = ?err,
                        "cell holds a spreadsheet error; reading it as empty"
                    );
                    continue;
                }
            };
            grid.set(row, col, value);
        }
    }

    Ok(grid)
}

fn float_cell(value: f64) -> CellValue {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        CellValue::Integer(value as i64)
    } else {
        CellValue::Float(value)
    }
}

pub(super) fn write_xlsx(grid: &Grid, path: &Path) -> Result<()> {
    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if GridFormat::for_path(path) != GridFormat::Workbook || !is_xlsx {
        bail!("only .xlsx workbooks can be written: {}", path.display());
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(SHEET_NAME)
        .context("failed to name worksheet")?;

    for (row_index, cells) in grid.padded_rows().enumerate() {
        let row = u32::try_from(row_index)
            .with_context(|| format!("row {} exceeds workbook limits", row_index + 1))?;
        for (col_index, cell) in cells.into_iter().enumerate() {
            let col = u16::try_from(col_index)
                .with_context(|| format!("column {} exceeds workbook limits", col_index + 1))?;
            let written = match cell {
                CellValue::Empty => continue,
                CellValue::Text(text) => worksheet.write_string(row, col, text.as_str()),
                CellValue::Integer(value) => worksheet.write_number(row, col, *value as f64),
                CellValue::Float(value) => worksheet.write_number(row, col, *value),
            };
            written.with_context(|| {
                format!("failed to write cell R{}C{}", row_index + 1, col_index + 1)
            })?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to save workbook: {}", path.display()))?;
    Ok(())
}
