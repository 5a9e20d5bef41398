use crate::grid::{CellRegion, Grid};
use crate::text::{CellValue, extract_keywords, is_zero_cell, normalize_cell};

/// Binary relevance values for a region, row-major, same shape as the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceMatrix {
    pub region: CellRegion,
    pub rows: Vec<Vec<u8>>,
}

impl RelevanceMatrix {
    pub fn ones(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|value| **value == 1)
            .count()
    }
}

/// 1 when the candidate cell satisfies the ground-truth cell.
///
/// Both cells spelling zero is a match. Otherwise any ground-truth keyword
/// occurring anywhere in the lowercased candidate text is a match, including
/// inside a longer word. Ground truth without keywords never matches.
pub fn cell_relevance(ground_truth: &str, candidate: &str) -> u8 {
    if is_zero_cell(ground_truth) && is_zero_cell(candidate) {
        return 1;
    }
    if ground_truth.is_empty() {
        return 0;
    }

    let keywords = extract_keywords(ground_truth);
    if keywords.is_empty() {
        return 0;
    }

    let candidate_lowered = candidate.to_lowercase();
    u8::from(
        keywords
            .iter()
            .any(|keyword| candidate_lowered.contains(keyword.as_str())),
    )
}

pub fn build_relevance_matrix(
    ground_truth: &Grid,
    candidate: &Grid,
    region: CellRegion,
) -> RelevanceMatrix {
    let rows = region
        .rows()
        .map(|row| {
            region
                .cols()
                .map(|col| {
                    let expected = normalize_cell(ground_truth.get(row, col));
                    let actual = normalize_cell(candidate.get(row, col));
                    cell_relevance(&expected, &actual)
                })
                .collect()
        })
        .collect();

    RelevanceMatrix { region, rows }
}

pub fn write_relevance_matrix(out: &mut Grid, matrix: &RelevanceMatrix) {
    for (row, values) in matrix.region.rows().zip(&matrix.rows) {
        for (col, value) in matrix.region.cols().zip(values) {
            out.set(row, col, CellValue::Integer(i64::from(*value)));
        }
    }
}
