use anyhow::{Result, bail};

use super::*;
use crate::commands::select::SelectorThresholds;
use crate::model::{FragmentMetadata, SearchHit};
use crate::store::{SearchFilter, SimilaritySearch};
use crate::text::CellValue;

const FORCE_MAJEURE_CLAUSE: &str = "Article 12 Force Majeure. Neither party is liable for events \
beyond reasonable control, including any act of god.";

/// Answers by target document: one strong clause, one unrelated fragment,
/// or a backend failure.
struct ScriptedSearch;

impl SimilaritySearch for ScriptedSearch {
    fn search(&self, _query: &str, _k: usize, filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        let document_id = filter.document_id.clone().unwrap_or_default();
        let text = match document_id.as_str() {
            "alpha.pdf" => FORCE_MAJEURE_CLAUSE,
            "beta.pdf" => "Schedule of payments for drilling equipment.",
            _ => bail!("index unavailable for {document_id}"),
        };

        Ok(vec![SearchHit {
            text: text.to_string(),
            metadata: FragmentMetadata {
                document_id,
                page_number: Some(1),
                category: Some("contract".to_string()),
            },
            distance: 0.1,
        }])
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn grid_has_header_and_one_row_per_question() {
    let questions = strings(&["Force Majeure 규정", "Pipeline tariff"]);
    let documents = strings(&["alpha.pdf", "beta.pdf"]);

    let outcome = build_question_matrix(
        &ScriptedSearch,
        &questions,
        &documents,
        16,
        &SelectorThresholds::default(),
    );
    let grid = &outcome.grid;

    assert_eq!(grid.row_count(), 3);
    assert_eq!(grid.get(1, 1), Some(&CellValue::Text("No".to_string())));
    assert_eq!(grid.get(1, 2), Some(&CellValue::Text("Question".to_string())));
    assert_eq!(grid.get(1, 4), Some(&CellValue::Text("beta.pdf".to_string())));
    assert_eq!(grid.get(3, 1), Some(&CellValue::Integer(2)));
    assert_eq!(
        grid.get(3, 2),
        Some(&CellValue::Text("Pipeline tariff".to_string()))
    );
}

#[test]
fn verdicts_are_previews_or_the_rejection_marker() {
    let questions = strings(&["Force Majeure 규정"]);
    let documents = strings(&["alpha.pdf", "beta.pdf"]);

    let outcome = build_question_matrix(
        &ScriptedSearch,
        &questions,
        &documents,
        16,
        &SelectorThresholds::default(),
    );

    match outcome.grid.get(2, 3) {
        Some(CellValue::Text(preview)) => {
            assert!(preview.starts_with("(Article 12 Force Majeure"));
            assert!(preview.ends_with(')'));
        }
        other => panic!("unexpected cell {other:?}"),
    }
    assert_eq!(outcome.grid.get(2, 4), Some(&CellValue::Text("0".to_string())));
    assert_eq!(outcome.accepted_cells, 1);
    assert_eq!(outcome.rejected_cells, 1);
    assert_eq!(outcome.failed_cells, 0);
}

#[test]
fn failed_pair_is_recorded_and_run_completes() {
    let questions = strings(&["Force Majeure 규정", "Force Majeure 규정"]);
    let documents = strings(&["broken.pdf", "alpha.pdf"]);

    let outcome = build_question_matrix(
        &ScriptedSearch,
        &questions,
        &documents,
        16,
        &SelectorThresholds::default(),
    );

    assert_eq!(outcome.grid.row_count(), 3);
    assert_eq!(outcome.grid.get(2, 3), Some(&CellValue::Text("0".to_string())));
    assert_eq!(outcome.grid.get(3, 3), Some(&CellValue::Text("0".to_string())));
    assert_eq!(outcome.failed_cells, 2);
    assert_eq!(outcome.accepted_cells, 2);
}

#[test]
fn no_documents_still_lists_questions() {
    let outcome = build_question_matrix(
        &ScriptedSearch,
        &default_questions(),
        &[],
        16,
        &SelectorThresholds::default(),
    );

    assert_eq!(outcome.grid.row_count(), 31);
    assert_eq!(outcome.grid.col_count(), 2);
}
