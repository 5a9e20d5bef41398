use anyhow::bail;
use rusqlite::Connection;

use super::*;
use crate::semantic::{
    DEFAULT_MODEL_ID, embed_text_local, embedding_text_hash, encode_embedding_blob,
    resolve_model_config,
};

struct UnavailableCatalogue;

impl DocumentCatalogue for UnavailableCatalogue {
    fn list_documents(&self, _category: Option<&str>) -> Result<Vec<String>> {
        bail!("index listing endpoint unavailable")
    }
}

struct FixedCatalogue(Vec<String>);

impl DocumentCatalogue for FixedCatalogue {
    fn list_documents(&self, _category: Option<&str>) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

fn seeded_store(rows: &[(&str, Option<i64>, Option<&str>, &str)]) -> FragmentStore {
    let connection = Connection::open_in_memory().expect("in-memory db");
    let mut store = FragmentStore::from_connection(connection, resolve_model_config(DEFAULT_MODEL_ID))
        .expect("store should initialise");
    let dims = store.model().dimensions;

    let mut batch = Vec::new();
    for (ordinal, (document_id, page_number, category, text)) in rows.iter().enumerate() {
        let ordinal = ordinal as i64;
        let fragment = StoredFragment {
            fragment_id: fragment_id(document_id, *page_number, ordinal, text),
            metadata: FragmentMetadata {
                document_id: document_id.to_string(),
                page_number: *page_number,
                category: category.map(str::to_string),
            },
            ordinal,
            text: text.to_string(),
            text_hash: embedding_text_hash(text),
        };
        store.upsert_fragment(&fragment).expect("fragment insert");
        batch.push((
            fragment.fragment_id.clone(),
            fragment.text_hash.clone(),
            encode_embedding_blob(&embed_text_local(text, dims)),
        ));
    }
    store.upsert_embeddings(&batch).expect("embedding insert");
    store
}

#[test]
fn search_orders_by_distance_and_applies_document_filter() {
    let store = seeded_store(&[
        ("contract1.pdf", Some(3), Some("contract"), "Article 12 Force Majeure events beyond reasonable control"),
        ("contract1.pdf", Some(9), Some("contract"), "Royalty rate and withholding tax obligations"),
        ("contract2.pdf", Some(1), Some("contract"), "Force Majeure notice within 14 days"),
    ]);

    let hits = store
        .search("force majeure", 5, &SearchFilter::for_document("contract1.pdf"))
        .expect("search should succeed");

    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|hit| hit.metadata.document_id == "contract1.pdf"));
    assert_eq!(hits[0].metadata.page_number, Some(3));
    assert!(hits[0].distance <= hits[1].distance);
}

#[test]
fn search_truncates_to_k_and_handles_zero() {
    let store = seeded_store(&[
        ("a.pdf", Some(1), None, "audit rights"),
        ("a.pdf", Some(2), None, "audit books and records"),
        ("b.pdf", Some(1), None, "audit inspection"),
    ]);

    let hits = store
        .search("audit", 2, &SearchFilter::default())
        .expect("search should succeed");
    assert_eq!(hits.len(), 2);

    let none = store
        .search("audit", 0, &SearchFilter::default())
        .expect("search should succeed");
    assert!(none.is_empty());
}

#[test]
fn search_filter_matches_category_and_document() {
    let metadata = FragmentMetadata {
        document_id: "law1.pdf".to_string(),
        page_number: Some(18),
        category: Some("law".to_string()),
    };

    assert!(SearchFilter::default().matches(&metadata));
    assert!(SearchFilter::for_document("law1.pdf").matches(&metadata));
    assert!(!SearchFilter::for_document("contract1.pdf").matches(&metadata));
    let by_category = SearchFilter {
        document_id: None,
        category: Some("contract".to_string()),
    };
    assert!(!by_category.matches(&metadata));
}

#[test]
fn store_catalogue_lists_distinct_documents_case_insensitively() {
    let store = seeded_store(&[
        ("contract_b.pdf", Some(1), Some("contract"), "insurance coverage"),
        ("Contract_A.pdf", Some(1), Some("contract"), "insurance policy"),
        ("contract_b.pdf", Some(2), Some("contract"), "deductible"),
        ("law1.pdf", Some(1), Some("law"), "petroleum law"),
    ]);

    let contracts = store
        .list_documents(Some("contract"))
        .expect("listing should succeed");
    assert_eq!(contracts, vec!["Contract_A.pdf", "contract_b.pdf"]);

    let all = store.list_documents(None).expect("listing should succeed");
    assert_eq!(all.len(), 3);
}

#[test]
fn fragment_ids_are_stable_and_distinguish_ordinals() {
    let first = fragment_id("contract1.pdf", Some(3), 0, "Article 1");
    assert_eq!(first.len(), 24);
    assert_eq!(first, fragment_id("contract1.pdf", Some(3), 0, "Article 1"));
    assert_ne!(first, fragment_id("contract1.pdf", Some(3), 1, "Article 1"));
}

#[test]
fn directory_catalogue_filters_extension_and_sorts_case_insensitively() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in ["beta.pdf", "Alpha.PDF", "notes.txt", "gamma.pdf"] {
        std::fs::write(dir.path().join(name), b"%PDF").expect("fixture file");
    }
    std::fs::create_dir(dir.path().join("archive.pdf")).expect("fixture dir");

    let catalogue = DirectoryCatalogue::new(dir.path().to_path_buf(), ".pdf");
    let names = catalogue.list_documents(None).expect("listing should succeed");
    assert_eq!(names, vec!["Alpha.PDF", "beta.pdf", "gamma.pdf"]);
}

#[test]
fn fallback_is_used_when_primary_fails_or_is_empty() {
    let fallback = FixedCatalogue(vec!["contract1.pdf".to_string()]);

    let names = list_documents_with_fallback(&UnavailableCatalogue, &fallback, Some("contract"));
    assert_eq!(names, vec!["contract1.pdf"]);

    let names = list_documents_with_fallback(&FixedCatalogue(Vec::new()), &fallback, None);
    assert_eq!(names, vec!["contract1.pdf"]);

    let primary = FixedCatalogue(vec!["contract9.pdf".to_string()]);
    let names = list_documents_with_fallback(&primary, &fallback, None);
    assert_eq!(names, vec!["contract9.pdf"]);
}

#[test]
fn unavailable_fallback_degrades_to_empty_listing() {
    let names = list_documents_with_fallback(&UnavailableCatalogue, &UnavailableCatalogue, None);
    assert!(names.is_empty());

    let missing = DirectoryCatalogue::new("/nonexistent/contract-eval".into(), "pdf");
    let names = list_documents_with_fallback(&UnavailableCatalogue, &missing, None);
    assert!(names.is_empty());
}
