use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::{DocumentsArgs, StoreArgs};
use crate::model::SearchHit;
use crate::semantic::resolve_model_config;
use crate::store::{
    DirectoryCatalogue, DocumentCatalogue, FragmentStore, SearchFilter, SimilaritySearch,
    list_documents_with_fallback,
};

pub fn run(args: DocumentsArgs) -> Result<()> {
    let store = open_store_for_listing(&args.store);
    let fallback = DirectoryCatalogue::new(args.data_dir.clone(), &args.extension);
    let names = catalogue_documents(store.as_ref(), &fallback, Some(&args.category));

    info!(
        category = %args.category,
        documents = names.len(),
        "document listing complete"
    );

    let mut stdout = io::stdout().lock();
    for name in &names {
        writeln!(stdout, "{name}").context("failed to write document listing")?;
    }

    Ok(())
}

/// The store opened read-only, or `None` when it cannot be opened.
pub fn open_store_for_listing(store_args: &StoreArgs) -> Option<FragmentStore> {
    let db_path = store_args.resolved_db_path();
    match FragmentStore::open_read_only(&db_path, resolve_model_config(&store_args.model_id)) {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(path = %db_path.display(), error = %err, "fragment store unavailable");
            None
        }
    }
}

/// Store listing with directory fallback. A missing store behaves like an
/// unavailable one.
pub fn catalogue_documents(
    store: Option<&FragmentStore>,
    fallback: &DirectoryCatalogue,
    category: Option<&str>,
) -> Vec<String> {
    let primary: &dyn DocumentCatalogue = match store {
        Some(store) => store,
        None => &MissingStore,
    };
    list_documents_with_fallback(primary, fallback, category)
}

/// Stands in for a store that could not be opened; every call fails.
pub struct MissingStore;

impl DocumentCatalogue for MissingStore {
    fn list_documents(&self, _category: Option<&str>) -> Result<Vec<String>> {
        bail!("fragment store is not open")
    }
}

impl SimilaritySearch for MissingStore {
    fn search(&self, _query: &str, _k: usize, _filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        bail!("fragment store is not open")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusqlite::Connection;

    use super::*;
    use crate::semantic::DEFAULT_MODEL_ID;

    fn data_dir_with_pdfs() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("b.PDF"), b"").expect("write");
        fs::write(dir.path().join("A.pdf"), b"").expect("write");
        fs::write(dir.path().join("notes.txt"), b"").expect("write");
        dir
    }

    #[test]
    fn missing_store_falls_back_to_directory() {
        let dir = data_dir_with_pdfs();
        let fallback = DirectoryCatalogue::new(dir.path().to_path_buf(), "pdf");

        let names = catalogue_documents(None, &fallback, Some("contract"));

        assert_eq!(names, vec!["A.pdf", "b.PDF"]);
    }

    #[test]
    fn empty_store_falls_back_to_directory() {
        let dir = data_dir_with_pdfs();
        let fallback = DirectoryCatalogue::new(dir.path().to_path_buf(), ".pdf");
        let connection = Connection::open_in_memory().expect("in-memory sqlite");
        let store = FragmentStore::from_connection(connection, resolve_model_config(DEFAULT_MODEL_ID))
            .expect("store");

        let names = catalogue_documents(Some(&store), &fallback, Some("contract"));

        assert_eq!(names, vec!["A.pdf", "b.PDF"]);
    }

    #[test]
    fn nothing_available_yields_empty_listing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fallback = DirectoryCatalogue::new(dir.path().join("absent"), "pdf");

        assert!(catalogue_documents(None, &fallback, None).is_empty());
    }
}
