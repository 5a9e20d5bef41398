use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use super::{load_fragments, parse_fragment_records};
use crate::cli::LoadArgs;
use crate::model::LoadRunManifest;
use crate::semantic::resolve_model_config;
use crate::store::{DB_SCHEMA_VERSION, FragmentStore};
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

pub fn run(args: LoadArgs) -> Result<()> {
    let model = resolve_model_config(&args.store.model_id);
    let db_path = args.store.resolved_db_path();
    let manifest_dir = args.store.manifest_dir();
    ensure_directory(&args.store.cache_root)?;
    ensure_directory(&manifest_dir)?;

    let started_at = now_utc_string();
    let run_stamp = utc_compact_string(Utc::now());
    let run_id = format!("load-{run_stamp}");

    info!(
        source = %args.source_path.display(),
        db = %db_path.display(),
        model_id = %model.model_id,
        refresh_mode = args.refresh_mode.as_str(),
        "loading fragments"
    );

    let file = File::open(&args.source_path)
        .with_context(|| format!("failed to open {}", args.source_path.display()))?;
    let records = parse_fragment_records(BufReader::new(file))
        .with_context(|| format!("failed to read {}", args.source_path.display()))?;

    let mut store = FragmentStore::open(&db_path, model.clone())?;
    let counts = load_fragments(&mut store, &records, args.refresh_mode, args.batch_size)?;

    let mut warnings = Vec::<String>::new();
    if counts.fragments_upserted == 0 {
        warn!(source = %args.source_path.display(), "no fragments loaded");
        warnings.push("source contained no non-blank fragments".to_string());
    }
    if counts.skipped_blank_records > 0 {
        warnings.push(format!(
            "skipped {} records with blank text or document id",
            counts.skipped_blank_records
        ));
    }

    let manifest = LoadRunManifest {
        manifest_version: 1,
        run_id,
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        started_at,
        finished_at: now_utc_string(),
        source_path: args.source_path.display().to_string(),
        source_sha256: sha256_file(&args.source_path)?,
        db_path: db_path.display().to_string(),
        model_id: model.model_id.clone(),
        embedding_dim: model.dimensions,
        refresh_mode: args.refresh_mode.as_str().to_string(),
        counts,
        warnings,
    };

    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join(format!("load_run_{run_stamp}.json")));
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        path = %manifest_path.display(),
        records = manifest.counts.records_read,
        fragments = manifest.counts.fragments_upserted,
        embeddings_updated = manifest.counts.embeddings_updated,
        fragments_pruned = manifest.counts.fragments_pruned,
        documents_total = manifest.counts.documents_total,
        "fragment load completed"
    );

    Ok(())
}
