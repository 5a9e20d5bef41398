use tracing::{info, warn};

use crate::commands::select::{
    DEFAULT_QUESTIONS, REJECTION_MARKER, SelectorThresholds, best_fragment_for_document,
};
use crate::grid::Grid;
use crate::store::SimilaritySearch;
use crate::text::CellValue;

pub fn default_questions() -> Vec<String> {
    DEFAULT_QUESTIONS
        .iter()
        .map(|question| question.to_string())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MatrixOutcome {
    pub grid: Grid,
    pub accepted_cells: usize,
    pub rejected_cells: usize,
    pub failed_cells: usize,
}

/// Header row `No, Question, <documents>`, then one row per question with a
/// verdict per document. A failed search is recorded as a rejection and the
/// run carries on.
pub fn build_question_matrix(
    search: &dyn SimilaritySearch,
    questions: &[String],
    documents: &[String],
    k: usize,
    thresholds: &SelectorThresholds,
) -> MatrixOutcome {
    let mut outcome = MatrixOutcome::default();

    let mut header = vec![
        CellValue::Text("No".to_string()),
        CellValue::Text("Question".to_string()),
    ];
    header.extend(documents.iter().map(|document| CellValue::Text(document.clone())));
    outcome.grid.push_row(header);

    for (index, question) in questions.iter().enumerate() {
        let mut row = Vec::<CellValue>::with_capacity(documents.len() + 2);
        row.push(CellValue::Integer(index as i64 + 1));
        row.push(CellValue::Text(question.clone()));

        for document in documents {
            let cell = match best_fragment_for_document(search, question, document, k, thresholds)
            {
                Ok(selection) => {
                    if selection.is_accepted() {
                        outcome.accepted_cells += 1;
                    } else {
                        outcome.rejected_cells += 1;
                    }
                    selection.cell_text().to_string()
                }
                Err(err) => {
                    warn!(
                        question = %question,
                        document_id = %document,
                        error = %err,
                        "search failed; recording rejection"
                    );
                    outcome.failed_cells += 1;
                    REJECTION_MARKER.to_string()
                }
            };
            row.push(CellValue::Text(cell));
        }

        outcome.grid.push_row(row);
        info!(
            question_no = index + 1,
            total = questions.len(),
            "question processed"
        );
    }

    outcome
}
