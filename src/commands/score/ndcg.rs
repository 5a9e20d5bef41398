use crate::grid::{CellRegion, Grid};
use crate::text::CellValue;

pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

fn discount(rank: usize) -> f64 {
    ((rank as f64) + 1.0).log2()
}

/// NDCG@k over `values` in the order given (position 1 is leftmost). The
/// ideal ordering puts every positive value first; a row without positives
/// scores 0.
pub fn ndcg_at_k(values: &[f64], k: usize) -> f64 {
    let k = k.min(values.len());
    if k == 0 {
        return 0.0;
    }

    let dcg = values
        .iter()
        .take(k)
        .enumerate()
        .map(|(index, relevance)| relevance / discount(index + 1))
        .sum::<f64>();

    let positives = values.iter().filter(|value| **value > 0.0).count();
    let ideal_hits = positives.min(k);
    if ideal_hits == 0 {
        return 0.0;
    }

    let idcg = (1..=ideal_hits).map(|rank| 1.0 / discount(rank)).sum::<f64>();
    if idcg > 0.0 { dcg / idcg } else { 0.0 }
}

pub fn ndcg_header(k: usize) -> String {
    format!("NDCG@{k}")
}

/// Scores every row of `region` as read back from `out` and writes the
/// rounded score to the column right of the region, with the header in row 1.
/// Cells that do not read as numbers count as 0.
pub fn append_ndcg_column(out: &mut Grid, region: CellRegion, k: usize) -> Vec<f64> {
    let write_col = region.end_col + 1;
    out.set(1, write_col, CellValue::Text(ndcg_header(k)));

    let mut scores = Vec::<f64>::with_capacity(region.row_count());
    for row in region.rows() {
        let values = region
            .cols()
            .map(|col| out.get(row, col).and_then(CellValue::as_f64).unwrap_or(0.0))
            .collect::<Vec<f64>>();
        let score = ndcg_at_k(&values, k);
        out.set(row, write_col, CellValue::Float(round6(score)));
        scores.push(score);
    }

    scores
}
