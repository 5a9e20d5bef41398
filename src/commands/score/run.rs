use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use super::evaluate_grids;
use crate::cli::ScoreArgs;
use crate::grid::{CellRegion, Grid};
use crate::model::EvaluationReport;
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

const DEFAULT_OUTPUT_FILE_NAME: &str = "ndcg_binary_match.xlsx";

pub fn run(args: ScoreArgs) -> Result<()> {
    let region = CellRegion::new(args.start_row, args.end_row, args.start_col, args.end_col)?;

    let ground_truth_path = args
        .ground_truth_path
        .clone()
        .unwrap_or_else(|| args.data_dir.join("ground_truth.xlsx"));
    let candidate_path = args
        .candidate_path
        .clone()
        .unwrap_or_else(|| args.data_dir.join("model_truth.xlsx"));
    let output_path = args.output_path.clone().unwrap_or_else(|| {
        ground_truth_path
            .parent()
            .map(|parent| parent.join(DEFAULT_OUTPUT_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE_NAME))
    });

    info!(
        ground_truth = %ground_truth_path.display(),
        candidate = %candidate_path.display(),
        region = %region,
        "scoring candidate grid"
    );

    let ground_truth = Grid::read(&ground_truth_path)?;
    let candidate = Grid::read(&candidate_path)?;
    let evaluation = evaluate_grids(&ground_truth, &candidate, region, args.k)?;

    evaluation.output.write(&output_path)?;
    info!(
        path = %output_path.display(),
        k = evaluation.k,
        rows = evaluation.row_scores.len(),
        matched_cells = evaluation.matrix.ones(),
        mean_ndcg = evaluation.summary.mean_ndcg,
        binary_accuracy = evaluation.summary.binary_accuracy,
        "wrote scored grid"
    );

    if let Some(report_path) = args.report_path.as_ref() {
        let report = EvaluationReport {
            manifest_version: 1,
            generated_at: now_utc_string(),
            ground_truth_path: ground_truth_path.display().to_string(),
            ground_truth_sha256: sha256_file(&ground_truth_path)?,
            candidate_path: candidate_path.display().to_string(),
            candidate_sha256: sha256_file(&candidate_path)?,
            output_path: output_path.display().to_string(),
            region,
            k: evaluation.k,
            row_ndcg: evaluation
                .row_scores
                .iter()
                .copied()
                .map(super::round6)
                .collect(),
            mean_ndcg: evaluation.summary.mean_ndcg,
            binary_accuracy: evaluation.summary.binary_accuracy,
        };
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote evaluation report");
    }

    Ok(())
}
