//! Similarity search and document catalogue seams.
//!
//! Commands receive these capabilities as trait objects so the selector and
//! matrix pipelines never reach for a global backend.

mod catalogue;
mod sqlite;
#[cfg(test)]
mod tests;

use anyhow::Result;
use serde::Serialize;

use crate::model::{FragmentMetadata, SearchHit};

pub use catalogue::{DirectoryCatalogue, list_documents_with_fallback};
pub use sqlite::{DB_SCHEMA_VERSION, FragmentStore, StoredFragment, fragment_id};

/// Metadata predicate applied before ranking. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    pub document_id: Option<String>,
    pub category: Option<String>,
}

impl SearchFilter {
    pub fn for_document(document_id: &str) -> Self {
        Self {
            document_id: Some(document_id.to_string()),
            category: None,
        }
    }

    pub fn matches(&self, metadata: &FragmentMetadata) -> bool {
        let document_ok = self
            .document_id
            .as_deref()
            .is_none_or(|document_id| document_id == metadata.document_id);
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|category| metadata.category.as_deref() == Some(category));
        document_ok && category_ok
    }
}

pub trait SimilaritySearch {
    /// Returns at most `k` hits passing `filter`, closest first.
    fn search(&self, query: &str, k: usize, filter: &SearchFilter) -> Result<Vec<SearchHit>>;
}

pub trait DocumentCatalogue {
    /// Distinct document identifiers, sorted case-insensitively.
    fn list_documents(&self, category: Option<&str>) -> Result<Vec<String>>;
}

pub fn sort_case_insensitive(names: &mut [String]) {
    names.sort_by(|left, right| {
        left.to_lowercase()
            .cmp(&right.to_lowercase())
            .then_with(|| left.cmp(right))
    });
}
