//! Ground truth vs. candidate evaluation: binary relevance matrix, per-row
//! NDCG and the summary rows.

mod ndcg;
mod relevance;
mod run;
mod summary;

use anyhow::{Result, bail};

use crate::grid::{CellRegion, Grid};

pub use run::run;

use ndcg::{append_ndcg_column, round6};
use relevance::{RelevanceMatrix, build_relevance_matrix, write_relevance_matrix};
use summary::{AggregateSummary, append_summary_rows};

#[cfg(test)]
use ndcg::{ndcg_at_k, ndcg_header};
#[cfg(test)]
use relevance::cell_relevance;
#[cfg(test)]
use summary::{BINARY_ACCURACY_LABEL, MEAN_NDCG_LABEL, SUMMARY_LABEL_COL};

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub output: Grid,
    pub matrix: RelevanceMatrix,
    pub k: usize,
    pub row_scores: Vec<f64>,
    pub summary: AggregateSummary,
}

/// Runs the full pipeline on a copy of the ground truth grid; neither input
/// is modified. `k` defaults to the region's column count.
pub fn evaluate_grids(
    ground_truth: &Grid,
    candidate: &Grid,
    region: CellRegion,
    k: Option<usize>,
) -> Result<Evaluation> {
    let k = k.unwrap_or_else(|| region.col_count());
    if k == 0 {
        bail!("k must be at least 1");
    }

    let mut output = ground_truth.clone();
    let matrix = build_relevance_matrix(ground_truth, candidate, region);
    write_relevance_matrix(&mut output, &matrix);

    let row_scores = append_ndcg_column(&mut output, region, k);
    let summary = AggregateSummary::compute(&row_scores, &matrix);
    append_summary_rows(&mut output, &matrix, &summary);

    Ok(Evaluation {
        output,
        matrix,
        k,
        row_scores,
        summary,
    })
}
