use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use super::selector::{Selection, SelectorThresholds, best_fragment_for_document};
use crate::cli::SelectArgs;
use crate::semantic::resolve_model_config;
use crate::store::FragmentStore;

#[derive(Debug, Serialize)]
struct SelectResponse<'a> {
    question: &'a str,
    document_id: &'a str,
    search_k: usize,
    thresholds: SelectorThresholds,
    cell: &'a str,
    selection: &'a Selection,
}

pub fn run(args: SelectArgs) -> Result<()> {
    let question = args.question.trim();
    if question.is_empty() {
        bail!("question must not be empty");
    }
    let document_id = args.document.trim();
    if document_id.is_empty() {
        bail!("document must not be empty");
    }

    let db_path = args.store.resolved_db_path();
    let store = FragmentStore::open_read_only(&db_path, resolve_model_config(&args.store.model_id))?;
    let thresholds = args.thresholds.resolve();

    let selection =
        best_fragment_for_document(&store, question, document_id, args.k, &thresholds)?;
    info!(
        document_id,
        accepted = selection.is_accepted(),
        "selection complete"
    );

    let mut stdout = io::stdout().lock();
    if args.json {
        let response = SelectResponse {
            question,
            document_id,
            search_k: args.k,
            thresholds,
            cell: selection.cell_text(),
            selection: &selection,
        };
        serde_json::to_writer_pretty(&mut stdout, &response)
            .context("failed to serialize selection")?;
        writeln!(stdout).context("failed to write selection")?;
    } else {
        writeln!(stdout, "{}", selection.cell_text()).context("failed to write selection")?;
    }

    Ok(())
}
