use serde::Serialize;

use super::ndcg::round6;
use super::relevance::RelevanceMatrix;
use crate::grid::Grid;
use crate::text::CellValue;

pub const SUMMARY_LABEL_COL: usize = 2;
pub const MEAN_NDCG_LABEL: &str = "Model Score (Mean NDCG)";
pub const BINARY_ACCURACY_LABEL: &str = "Binary Accuracy";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub mean_ndcg: f64,
    pub binary_accuracy: f64,
}

impl AggregateSummary {
    /// Both values are rounded to six decimals.
    pub fn compute(row_scores: &[f64], matrix: &RelevanceMatrix) -> Self {
        let mean_ndcg = if row_scores.is_empty() {
            0.0
        } else {
            row_scores.iter().sum::<f64>() / row_scores.len() as f64
        };

        let total = matrix.region.cell_count();
        let binary_accuracy = if total == 0 {
            0.0
        } else {
            matrix.ones() as f64 / total as f64
        };

        Self {
            mean_ndcg: round6(mean_ndcg),
            binary_accuracy: round6(binary_accuracy),
        }
    }
}

/// Mean NDCG goes two rows below the region, binary accuracy on the next
/// row; values sit in the NDCG column.
pub fn append_summary_rows(out: &mut Grid, matrix: &RelevanceMatrix, summary: &AggregateSummary) {
    let value_col = matrix.region.end_col + 1;
    let base_row = matrix.region.end_row + 2;

    out.set(
        base_row,
        SUMMARY_LABEL_COL,
        CellValue::Text(MEAN_NDCG_LABEL.to_string()),
    );
    out.set(base_row, value_col, CellValue::Float(summary.mean_ndcg));
    out.set(
        base_row + 1,
        SUMMARY_LABEL_COL,
        CellValue::Text(BINARY_ACCURACY_LABEL.to_string()),
    );
    out.set(base_row + 1, value_col, CellValue::Float(summary.binary_accuracy));
}
