use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use super::Grid;
use crate::text::CellValue;

pub(super) fn read_csv(path: &Path) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open grid: {}", path.display()))?;

    let mut grid = Grid::new();
    for (index, record) in reader.byte_records().enumerate() {
        let row = index + 1;
        let record = record
            .with_context(|| format!("failed to parse row {row} of {}", path.display()))?;

        let cells = record
            .iter()
            .enumerate()
            .map(|(col, field)| match std::str::from_utf8(field) {
                Ok(text) => CellValue::from_raw(text),
                Err(_) => {
                    warn!(
                        path = %path.display(),
                        row,
                        column = col + 1,
                        "cell is not valid UTF-8; reading it as empty"
                    );
                    CellValue::Empty
                }
            })
            .collect();
        grid.push_row(cells);
    }

    Ok(grid)
}

pub(super) fn write_csv(grid: &Grid, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create grid: {}", path.display()))?;

    for (index, cells) in grid.padded_rows().enumerate() {
        let record = cells
            .iter()
            .map(|cell| cell.to_string())
            .collect::<Vec<String>>();
        writer.write_record(&record).with_context(|| {
            format!("failed to write row {} of {}", index + 1, path.display())
        })?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush grid: {}", path.display()))?;
    Ok(())
}
