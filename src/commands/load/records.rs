use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::BufRead;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::RefreshMode;
use crate::model::{FragmentMetadata, FragmentRecord, LoadCounts};
use crate::semantic::{
    embed_text_local, embedding_text_hash, encode_embedding_blob, fragment_payload_for_embedding,
};
use crate::store::{FragmentStore, StoredFragment, fragment_id};

/// Parses one record per non-blank line. Errors name the 1-based line.
pub fn parse_fragment_records<R: BufRead>(reader: R) -> Result<Vec<FragmentRecord>> {
    let mut records = Vec::<FragmentRecord>::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let record = serde_json::from_str::<FragmentRecord>(&line)
            .with_context(|| format!("failed to parse fragment record on line {}", index + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Pending embedding rows flushed to the store once `batch_size` is reached.
struct LoadBatcher {
    batch_size: usize,
    pending: Vec<(String, String, Vec<u8>)>,
    written: usize,
}

impl LoadBatcher {
    fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pending: Vec::new(),
            written: 0,
        }
    }

    fn push(
        &mut self,
        store: &mut FragmentStore,
        row: (String, String, Vec<u8>),
    ) -> Result<()> {
        self.pending.push(row);
        if self.pending.len() >= self.batch_size {
            self.flush(store)?;
            info!(updated = self.written, "embedding batch committed");
        }
        Ok(())
    }

    fn flush(&mut self, store: &mut FragmentStore) -> Result<()> {
        self.written += store.upsert_embeddings(&self.pending)?;
        self.pending.clear();
        Ok(())
    }

    fn written(&self) -> usize {
        self.written
    }
}

/// Stores every non-blank record and refreshes embeddings according to
/// `refresh_mode`. Ordinals count non-blank records per document in input
/// order, so reloading the same file yields the same fragment ids. Each
/// loaded document is replaced as a whole: its fragments missing from this
/// load are deleted. Documents absent from the load are left alone.
pub fn load_fragments(
    store: &mut FragmentStore,
    records: &[FragmentRecord],
    refresh_mode: RefreshMode,
    batch_size: usize,
) -> Result<LoadCounts> {
    let dimensions = store.model().dimensions;
    let mut ordinals = HashMap::<String, i64>::new();
    let mut batcher = LoadBatcher::new(batch_size);
    let mut loaded_ids = BTreeMap::<String, HashSet<String>>::new();

    let mut skipped_blank_records = 0usize;
    let mut fragments_upserted = 0usize;
    let mut stale_embeddings_before = 0usize;

    for record in records {
        let document_id = record.document_id.trim();
        let payload = fragment_payload_for_embedding(&record.text);
        let Some(payload) = payload.filter(|_| !document_id.is_empty()) else {
            skipped_blank_records += 1;
            continue;
        };

        let ordinal = ordinals.entry(document_id.to_string()).or_insert(0);
        let current_ordinal = *ordinal;
        *ordinal += 1;

        let text_hash = embedding_text_hash(&payload);
        let fragment = StoredFragment {
            fragment_id: fragment_id(document_id, record.page_number, current_ordinal, &record.text),
            metadata: FragmentMetadata {
                document_id: document_id.to_string(),
                page_number: record.page_number,
                category: record.category.clone(),
            },
            ordinal: current_ordinal,
            text: record.text.clone(),
            text_hash: text_hash.clone(),
        };
        store.upsert_fragment(&fragment)?;
        fragments_upserted += 1;
        loaded_ids
            .entry(document_id.to_string())
            .or_default()
            .insert(fragment.fragment_id.clone());

        let stale = store
            .existing_embedding(&fragment.fragment_id)?
            .map(|existing| existing.text_hash != text_hash || existing.embedding_dim != dimensions)
            .unwrap_or(true);
        if stale {
            stale_embeddings_before += 1;
        }

        let should_update = match refresh_mode {
            RefreshMode::Full => true,
            RefreshMode::MissingOrStale => stale,
        };
        if !should_update {
            debug!(fragment_id = %fragment.fragment_id, "embedding is current");
            continue;
        }

        let blob = encode_embedding_blob(&embed_text_local(&payload, dimensions));
        batcher.push(store, (fragment.fragment_id, text_hash, blob))?;
    }
    batcher.flush(store)?;

    let mut fragments_pruned = 0usize;
    for (document_id, keep) in &loaded_ids {
        let pruned = store.prune_document(document_id, keep)?;
        if pruned > 0 {
            info!(document_id = %document_id, pruned, "removed fragments no longer in source");
        }
        fragments_pruned += pruned;
    }

    Ok(LoadCounts {
        records_read: records.len(),
        skipped_blank_records,
        fragments_upserted,
        embeddings_updated: batcher.written(),
        stale_embeddings_before,
        fragments_pruned,
        documents_total: store.count("SELECT COUNT(DISTINCT document_id) FROM fragments")?,
        fragments_total: store.count("SELECT COUNT(*) FROM fragments")?,
    })
}
