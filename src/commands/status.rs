use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{LoadRunManifest, MatrixRunManifest};
use crate::semantic::resolve_model_config;
use crate::store::FragmentStore;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.store.manifest_dir();
    let db_path = args.store.resolved_db_path();

    info!(cache_root = %args.store.cache_root.display(), "status requested");

    match latest_manifest(&manifest_dir, "load_run_")? {
        Some(path) => {
            let manifest: LoadRunManifest = read_manifest(&path)?;
            info!(
                run_id = %manifest.run_id,
                finished_at = %manifest.finished_at,
                source = %manifest.source_path,
                model_id = %manifest.model_id,
                refresh_mode = %manifest.refresh_mode,
                fragments = manifest.counts.fragments_upserted,
                embeddings_updated = manifest.counts.embeddings_updated,
                skipped = manifest.counts.skipped_blank_records,
                "latest load run"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no load manifest found"),
    }

    match latest_manifest(&manifest_dir, "matrix_run_")? {
        Some(path) => {
            let manifest: MatrixRunManifest = read_manifest(&path)?;
            info!(
                run_id = %manifest.run_id,
                generated_at = %manifest.generated_at,
                output = %manifest.output_path,
                questions = manifest.question_count,
                documents = manifest.document_count,
                accepted = manifest.accepted_cells,
                rejected = manifest.rejected_cells,
                failed = manifest.failed_cells,
                "latest matrix run"
            );
        }
        None => info!(path = %manifest_dir.display(), "no matrix manifest found"),
    }

    if db_path.exists() {
        let store = FragmentStore::open_read_only(&db_path, resolve_model_config(&args.store.model_id))?;
        let documents =
            store.count("SELECT COUNT(DISTINCT document_id) FROM fragments").unwrap_or(0);
        let fragments = store.count("SELECT COUNT(*) FROM fragments").unwrap_or(0);
        let embeddings = store
            .count("SELECT COUNT(*) FROM fragment_embeddings")
            .unwrap_or(0);

        info!(
            path = %db_path.display(),
            documents,
            fragments,
            embeddings,
            "fragment store status"
        );
    } else {
        warn!(path = %db_path.display(), "fragment store missing");
    }

    Ok(())
}

/// Newest `<prefix>*.json` in `dir`; compact UTC stamps sort chronologically.
fn latest_manifest(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut latest: Option<PathBuf> = None;
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("failed to read entry in {}", dir.display()))?
            .path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !name.starts_with(prefix) || !name.ends_with(".json") {
            continue;
        }
        if latest.as_ref().is_none_or(|current| path > *current) {
            latest = Some(path);
        }
    }

    Ok(latest)
}

fn read_manifest<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
