use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use super::{DocumentCatalogue, SearchFilter, SimilaritySearch, sort_case_insensitive};
use crate::model::{FragmentMetadata, SearchHit};
use crate::semantic::{
    SemanticModelConfig, cosine_distance, decode_embedding_blob, embed_text_local,
};
use crate::util::{now_utc_string, sha256_hex};

pub const DB_SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFragment {
    pub fragment_id: String,
    pub metadata: FragmentMetadata,
    pub ordinal: i64,
    pub text: String,
    pub text_hash: String,
}

#[derive(Debug, Clone)]
pub struct ExistingEmbedding {
    pub text_hash: String,
    pub embedding_dim: usize,
}

/// Stable id for a fragment: first 24 hex chars of the SHA-256 over its
/// document, page, ordinal within the document and text.
pub fn fragment_id(document_id: &str, page_number: Option<i64>, ordinal: i64, text: &str) -> String {
    let page = page_number.map(|value| value.to_string()).unwrap_or_default();
    let digest = sha256_hex(format!("{document_id}|{page}|{ordinal}|{text}").as_bytes());
    digest[..24].to_string()
}

/// SQLite-backed fragment store; serves similarity search and the document
/// catalogue for one embedding model.
pub struct FragmentStore {
    connection: Connection,
    model: SemanticModelConfig,
}

impl FragmentStore {
    pub fn open(db_path: &Path, model: SemanticModelConfig) -> Result<Self> {
        let connection = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open fragment store: {}", db_path.display()))?;

        connection
            .pragma_update(None, "journal_mode", "WAL")
            .context("failed to set journal_mode=WAL")?;
        connection
            .pragma_update(None, "synchronous", "NORMAL")
            .context("failed to set synchronous=NORMAL")?;

        Self::from_connection(connection, model)
    }

    pub fn open_read_only(db_path: &Path, model: SemanticModelConfig) -> Result<Self> {
        let connection = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| {
            format!(
                "failed to open fragment store read-only: {}",
                db_path.display()
            )
        })?;

        Ok(Self { connection, model })
    }

    pub fn from_connection(connection: Connection, model: SemanticModelConfig) -> Result<Self> {
        let store = Self { connection, model };
        store.ensure_schema()?;
        store.ensure_model_entry()?;
        Ok(store)
    }

    pub fn model(&self) -> &SemanticModelConfig {
        &self.model
    }

    fn ensure_schema(&self) -> Result<()> {
        self.connection
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS metadata (
                  key TEXT PRIMARY KEY,
                  value TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS fragments (
                  fragment_id TEXT PRIMARY KEY,
                  document_id TEXT NOT NULL,
                  page_number INTEGER,
                  category TEXT,
                  ordinal INTEGER NOT NULL DEFAULT 0,
                  text TEXT NOT NULL,
                  text_hash TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_fragments_document
                  ON fragments(document_id);
                CREATE INDEX IF NOT EXISTS idx_fragments_category
                  ON fragments(category);

                CREATE TABLE IF NOT EXISTS embedding_models (
                  model_id TEXT PRIMARY KEY,
                  backend TEXT NOT NULL,
                  model_name TEXT NOT NULL,
                  dimensions INTEGER NOT NULL,
                  normalize INTEGER NOT NULL,
                  created_at TEXT NOT NULL,
                  config_json TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS fragment_embeddings (
                  fragment_id TEXT NOT NULL,
                  model_id TEXT NOT NULL,
                  embedding BLOB NOT NULL,
                  embedding_dim INTEGER NOT NULL,
                  text_hash TEXT NOT NULL,
                  generated_at TEXT NOT NULL,
                  PRIMARY KEY(fragment_id, model_id),
                  FOREIGN KEY(fragment_id) REFERENCES fragments(fragment_id),
                  FOREIGN KEY(model_id) REFERENCES embedding_models(model_id)
                );
                ",
            )
            .context("failed to create fragment store schema")?;

        self.connection
            .execute(
                "
                INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
                ON CONFLICT(key) DO UPDATE SET value=excluded.value
                ",
                [DB_SCHEMA_VERSION],
            )
            .context("failed to record schema version")?;

        Ok(())
    }

    fn ensure_model_entry(&self) -> Result<()> {
        let config_json = serde_json::to_string(&self.model)
            .context("failed to serialize embedding model config")?;

        self.connection.execute(
            "
            INSERT INTO embedding_models(model_id, backend, model_name, dimensions, normalize, created_at, config_json)
            VALUES(?1, ?2, ?3, ?4, 1, ?5, ?6)
            ON CONFLICT(model_id) DO UPDATE SET
              backend=excluded.backend,
              model_name=excluded.model_name,
              dimensions=excluded.dimensions,
              normalize=excluded.normalize,
              config_json=excluded.config_json
            ",
            params![
                self.model.model_id,
                self.model.backend,
                self.model.model_name,
                self.model.dimensions as i64,
                now_utc_string(),
                config_json,
            ],
        )?;

        Ok(())
    }

    pub fn upsert_fragment(&self, fragment: &StoredFragment) -> Result<()> {
        self.connection
            .execute(
                "
                INSERT INTO fragments(fragment_id, document_id, page_number, category, ordinal, text, text_hash)
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(fragment_id) DO UPDATE SET
                  document_id=excluded.document_id,
                  page_number=excluded.page_number,
                  category=excluded.category,
                  ordinal=excluded.ordinal,
                  text=excluded.text,
                  text_hash=excluded.text_hash
                ",
                params![
                    fragment.fragment_id,
                    fragment.metadata.document_id,
                    fragment.metadata.page_number,
                    fragment.metadata.category,
                    fragment.ordinal,
                    fragment.text,
                    fragment.text_hash,
                ],
            )
            .with_context(|| format!("failed to upsert fragment {}", fragment.fragment_id))?;

        Ok(())
    }

    pub fn existing_embedding(&self, fragment_id: &str) -> Result<Option<ExistingEmbedding>> {
        let row = self
            .connection
            .query_row(
                "
                SELECT text_hash, embedding_dim
                FROM fragment_embeddings
                WHERE fragment_id = ?1 AND model_id = ?2
                LIMIT 1
                ",
                params![fragment_id, self.model.model_id],
                |row| {
                    Ok(ExistingEmbedding {
                        text_hash: row.get(0)?,
                        embedding_dim: row.get::<_, i64>(1)? as usize,
                    })
                },
            )
            .optional()?;

        Ok(row)
    }

    /// Writes `(fragment_id, text_hash, embedding_blob)` rows in one
    /// transaction and returns how many were written.
    pub fn upsert_embeddings(&mut self, batch: &[(String, String, Vec<u8>)]) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let generated_at = now_utc_string();
        let tx = self
            .connection
            .transaction()
            .context("failed to start embedding transaction")?;
        {
            let mut statement = tx.prepare(
                "
                INSERT INTO fragment_embeddings(fragment_id, model_id, embedding, embedding_dim, text_hash, generated_at)
                VALUES(?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(fragment_id, model_id) DO UPDATE SET
                  embedding=excluded.embedding,
                  embedding_dim=excluded.embedding_dim,
                  text_hash=excluded.text_hash,
                  generated_at=excluded.generated_at
                ",
            )?;

            for (fragment_id, text_hash, blob) in batch {
                statement.execute(params![
                    fragment_id,
                    self.model.model_id,
                    blob,
                    self.model.dimensions as i64,
                    text_hash,
                    generated_at,
                ])?;
            }
        }
        tx.commit().context("failed to commit embedding batch")?;

        Ok(batch.len())
    }

    /// Deletes the document's fragments, and their embeddings for every
    /// model, whose ids are not in `keep`. Returns how many were deleted.
    pub fn prune_document(&mut self, document_id: &str, keep: &HashSet<String>) -> Result<usize> {
        let tx = self
            .connection
            .transaction()
            .context("failed to start prune transaction")?;

        let stale_ids = {
            let mut statement =
                tx.prepare("SELECT fragment_id FROM fragments WHERE document_id = ?1")?;
            statement
                .query_map([document_id], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?
                .into_iter()
                .filter(|fragment_id| !keep.contains(fragment_id))
                .collect::<Vec<String>>()
        };

        for fragment_id in &stale_ids {
            tx.execute(
                "DELETE FROM fragment_embeddings WHERE fragment_id = ?1",
                [fragment_id],
            )?;
            tx.execute("DELETE FROM fragments WHERE fragment_id = ?1", [fragment_id])?;
        }
        tx.commit()
            .with_context(|| format!("failed to prune fragments of {document_id}"))?;

        Ok(stale_ids.len())
    }

    pub fn count(&self, sql: &str) -> Result<i64> {
        let count = self.connection.query_row(sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

impl SimilaritySearch for FragmentStore {
    fn search(&self, query: &str, k: usize, filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let embedding_dim = self.model.dimensions;
        let query_embedding = embed_text_local(query, embedding_dim);

        let mut statement = self.connection.prepare(
            "
            SELECT
              f.document_id,
              f.page_number,
              f.category,
              f.ordinal,
              f.text,
              e.embedding,
              e.embedding_dim
            FROM fragment_embeddings e
            JOIN fragments f ON f.fragment_id = e.fragment_id
            WHERE
              e.model_id = ?1
              AND (?2 IS NULL OR f.document_id = ?2)
              AND (?3 IS NULL OR f.category = ?3)
            ",
        )?;

        let mut rows = statement.query(params![
            self.model.model_id,
            filter.document_id,
            filter.category,
        ])?;

        let mut scored = Vec::<(SearchHit, i64)>::new();
        while let Some(row) = rows.next()? {
            let row_dim = row.get::<_, i64>(6)? as usize;
            if row_dim != embedding_dim {
                continue;
            }

            let blob = row.get::<_, Vec<u8>>(5)?;
            let Some(embedding) = decode_embedding_blob(&blob, embedding_dim) else {
                continue;
            };

            let hit = SearchHit {
                text: row.get(4)?,
                metadata: FragmentMetadata {
                    document_id: row.get(0)?,
                    page_number: row.get(1)?,
                    category: row.get(2)?,
                },
                distance: cosine_distance(&query_embedding, &embedding),
            };
            scored.push((hit, row.get(3)?));
        }

        scored.sort_by(|(left, left_ordinal), (right, right_ordinal)| {
            left.distance
                .total_cmp(&right.distance)
                .then_with(|| left.metadata.document_id.cmp(&right.metadata.document_id))
                .then(
                    left.metadata
                        .page_number
                        .unwrap_or(i64::MAX)
                        .cmp(&right.metadata.page_number.unwrap_or(i64::MAX)),
                )
                .then(left_ordinal.cmp(right_ordinal))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(hit, _)| hit).collect())
    }
}

impl DocumentCatalogue for FragmentStore {
    fn list_documents(&self, category: Option<&str>) -> Result<Vec<String>> {
        let mut statement = self.connection.prepare(
            "
            SELECT DISTINCT document_id
            FROM fragments
            WHERE (?1 IS NULL OR category = ?1) AND document_id <> ''
            ",
        )?;

        let mut names = statement
            .query_map([category], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .context("failed to list documents")?;
        sort_case_insensitive(&mut names);
        Ok(names)
    }
}
