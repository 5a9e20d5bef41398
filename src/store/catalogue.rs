use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{DocumentCatalogue, sort_case_insensitive};

/// Lists files with a given extension in one directory. Used when the store
/// cannot provide a listing.
#[derive(Debug, Clone)]
pub struct DirectoryCatalogue {
    pub directory: PathBuf,
    pub extension: String,
}

impl DirectoryCatalogue {
    pub fn new(directory: PathBuf, extension: &str) -> Self {
        Self {
            directory,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }
}

impl DocumentCatalogue for DirectoryCatalogue {
    fn list_documents(&self, _category: Option<&str>) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.directory)
            .with_context(|| format!("failed to read {}", self.directory.display()))?;

        let mut names = Vec::<String>::new();
        for entry in entries {
            let entry = entry.with_context(|| {
                format!("failed to read entry in {}", self.directory.display())
            })?;
            let path = entry.path();

            if !entry
                .file_type()
                .with_context(|| format!("failed to inspect file type: {}", path.display()))?
                .is_file()
            {
                continue;
            }

            let matches_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension));
            if !matches_extension {
                continue;
            }

            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }

        sort_case_insensitive(&mut names);
        Ok(names)
    }
}

/// Primary listing when it succeeds with at least one document, otherwise the
/// fallback. Never fails: an unavailable fallback yields an empty list.
pub fn list_documents_with_fallback(
    primary: &dyn DocumentCatalogue,
    fallback: &dyn DocumentCatalogue,
    category: Option<&str>,
) -> Vec<String> {
    match primary.list_documents(category) {
        Ok(names) if !names.is_empty() => return names,
        Ok(_) => info!(category = category.unwrap_or(""), "primary catalogue is empty"),
        Err(err) => warn!(error = %err, "primary catalogue unavailable"),
    }

    match fallback.list_documents(category) {
        Ok(names) => {
            info!(documents = names.len(), "using fallback catalogue");
            names
        }
        Err(err) => {
            warn!(error = %err, "fallback catalogue unavailable");
            Vec::new()
        }
    }
}
