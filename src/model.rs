use serde::{Deserialize, Serialize};

use crate::grid::CellRegion;

/// One line of a fragment load file.
#[derive(Debug, Clone, Deserialize)]
pub struct FragmentRecord {
    #[serde(alias = "file_name")]
    pub document_id: String,
    #[serde(default, alias = "page_num")]
    pub page_number: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(alias = "page_content")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentMetadata {
    pub document_id: String,
    pub page_number: Option<i64>,
    pub category: Option<String>,
}

/// A similarity search result; lists of hits are ordered by ascending distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub text: String,
    pub metadata: FragmentMetadata,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadCounts {
    pub records_read: usize,
    pub skipped_blank_records: usize,
    pub fragments_upserted: usize,
    pub embeddings_updated: usize,
    pub stale_embeddings_before: usize,
    #[serde(default)]
    pub fragments_pruned: usize,
    pub documents_total: i64,
    pub fragments_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub started_at: String,
    pub finished_at: String,
    pub source_path: String,
    pub source_sha256: String,
    pub db_path: String,
    pub model_id: String,
    pub embedding_dim: usize,
    pub refresh_mode: String,
    pub counts: LoadCounts,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub output_path: String,
    pub question_count: usize,
    pub document_count: usize,
    pub search_k: usize,
    pub accepted_cells: usize,
    pub rejected_cells: usize,
    pub failed_cells: usize,
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub ground_truth_path: String,
    pub ground_truth_sha256: String,
    pub candidate_path: String,
    pub candidate_sha256: String,
    pub output_path: String,
    pub region: CellRegion,
    pub k: usize,
    pub row_ndcg: Vec<f64>,
    pub mean_ndcg: f64,
    pub binary_accuracy: f64,
}
