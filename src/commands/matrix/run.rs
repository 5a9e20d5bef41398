use anyhow::{Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use super::{build_question_matrix, default_questions};
use crate::cli::MatrixArgs;
use crate::commands::documents::{MissingStore, catalogue_documents, open_store_for_listing};
use crate::model::MatrixRunManifest;
use crate::store::{DirectoryCatalogue, SimilaritySearch};
use crate::util::{now_utc_string, read_non_blank_lines, utc_compact_string, write_json_pretty};

pub fn run(args: MatrixArgs) -> Result<()> {
    if args.k == 0 {
        bail!("k must be at least 1");
    }

    let questions = match args.questions_path.as_ref() {
        Some(path) => read_non_blank_lines(path)?,
        None => default_questions(),
    };
    if questions.is_empty() {
        bail!("no questions to ask");
    }

    let store = open_store_for_listing(&args.store);
    let search: &dyn SimilaritySearch = match store.as_ref() {
        Some(store) => store,
        None => &MissingStore,
    };
    let fallback = DirectoryCatalogue::new(args.data_dir.clone(), &args.extension);
    let documents = catalogue_documents(store.as_ref(), &fallback, Some(&args.category));
    if documents.is_empty() {
        warn!(category = %args.category, "no documents found; grid will only hold questions");
    }

    let thresholds = args.thresholds.resolve();
    info!(
        questions = questions.len(),
        documents = documents.len(),
        k = args.k,
        "building question matrix"
    );

    let outcome = build_question_matrix(search, &questions, &documents, args.k, &thresholds);

    let run_stamp = utc_compact_string(Utc::now());
    let output_path = args
        .output_path
        .clone()
        .unwrap_or_else(|| args.data_dir.join(format!("multi_question_matrix_{run_stamp}.xlsx")));
    outcome.grid.write(&output_path)?;

    let manifest = MatrixRunManifest {
        manifest_version: 1,
        run_id: format!("matrix-{run_stamp}"),
        generated_at: now_utc_string(),
        output_path: output_path.display().to_string(),
        question_count: questions.len(),
        document_count: documents.len(),
        search_k: args.k,
        accepted_cells: outcome.accepted_cells,
        rejected_cells: outcome.rejected_cells,
        failed_cells: outcome.failed_cells,
        documents,
    };
    let manifest_path = args
        .store
        .manifest_dir()
        .join(format!("matrix_run_{run_stamp}.json"));
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        path = %output_path.display(),
        manifest = %manifest_path.display(),
        accepted = manifest.accepted_cells,
        rejected = manifest.rejected_cells,
        failed = manifest.failed_cells,
        "question matrix written"
    );

    Ok(())
}
