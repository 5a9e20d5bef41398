//! 1-based spreadsheet grids and the file formats they are read from and
//! written to.

mod delimited;
mod workbook;

use std::fmt;
use std::path::Path;

use anyhow::{Result, bail};

use crate::text::CellValue;
use crate::util::ensure_directory;

/// Inclusive, 1-based rectangular cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CellRegion {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl CellRegion {
    pub fn new(start_row: usize, end_row: usize, start_col: usize, end_col: usize) -> Result<Self> {
        if start_row == 0 || start_col == 0 {
            bail!("cell region is 1-based; got start_row={start_row} start_col={start_col}");
        }
        if end_row < start_row || end_col < start_col {
            bail!(
                "cell region is inverted: rows {start_row}..={end_row}, columns {start_col}..={end_col}"
            );
        }

        Ok(Self {
            start_row,
            end_row,
            start_col,
            end_col,
        })
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.start_row..=self.end_row
    }

    pub fn cols(&self) -> std::ops::RangeInclusive<usize> {
        self.start_col..=self.end_col
    }

    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    pub fn cell_count(&self) -> usize {
        self.row_count() * self.col_count()
    }
}

impl fmt::Display for CellRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R{}C{}:R{}C{}",
            self.start_row, self.start_col, self.end_row, self.end_col
        )
    }
}

/// On-disk grid format, chosen by file extension.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GridFormat {
    /// `.xlsx`, `.xlsm`, `.xls`, `.ods`: first worksheet. Only `.xlsx` can be
    /// written.
    Workbook,
    /// Anything else: header-less CSV.
    Delimited,
}

impl GridFormat {
    pub fn for_path(path: &Path) -> Self {
        let is_workbook = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ["xlsx", "xlsm", "xls", "ods"]
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if is_workbook {
            Self::Workbook
        } else {
            Self::Delimited
        }
    }
}

/// Spreadsheet-like grid addressed by 1-based `(row, column)`. Reads outside
/// the populated area yield an empty cell; writes grow the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows.get(row - 1).and_then(|cells| cells.get(col - 1))
    }

    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        assert!(row > 0 && col > 0, "grid coordinates are 1-based");
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < col {
            cells.resize_with(col, CellValue::default);
        }
        cells[col - 1] = value;
    }

    pub fn push_row(&mut self, cells: Vec<CellValue>) {
        self.rows.push(cells);
    }

    /// Cells that cannot be decoded are read as empty and logged; only
    /// unreadable files fail.
    pub fn read(path: &Path) -> Result<Self> {
        match GridFormat::for_path(path) {
            GridFormat::Workbook => workbook::read_first_sheet(path),
            GridFormat::Delimited => delimited::read_csv(path),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            ensure_directory(parent)?;
        }

        match GridFormat::for_path(path) {
            GridFormat::Workbook => workbook::write_xlsx(self, path),
            GridFormat::Delimited => delimited::write_csv(self, path),
        }
    }

    fn padded_rows(&self) -> impl Iterator<Item = Vec<&CellValue>> + '_ {
        let width = self.col_count();
        self.rows.iter().map(move |cells| {
            (0..width)
                .map(|col| cells.get(col).unwrap_or(&EMPTY_CELL))
                .collect()
        })
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;
