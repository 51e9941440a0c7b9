
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{AgentError, Result};

/// A source document discovered under the configured directory.
///
/// `name` is the path relative to the source directory, which keeps names
/// unique within a run even when subdirectories repeat a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub path: PathBuf,
    pub body: String,
    pub metadata: BTreeMap<String, String>,
}

/// Recursively discover markdown files under `source_dir`.
///
/// A missing directory fails with `SourceNotFound` and an empty directory
/// with `NoDocumentsFound`; both are recoverable conditions the ingestion
/// pipeline downgrades to warnings.
pub fn discover_documents(source_dir: &Path) -> Result<Vec<Document>> {
    if !source_dir.is_dir() {
        return Err(AgentError::SourceNotFound(source_dir.to_path_buf()));
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| anyhow::anyhow!("Failed to walk source directory: {e}"))?;

        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }

        let body = fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read document: {}", entry.path().display()))?;

        let name = entry
            .path()
            .strip_prefix(source_dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/");

        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), name.clone());

        debug!("Discovered document: {} ({} bytes)", name, body.len());

        documents.push(Document {
            name,
            path: entry.path().to_path_buf(),
            body,
            metadata,
        });
    }

    if documents.is_empty() {
        return Err(AgentError::NoDocumentsFound(source_dir.to_path_buf()));
    }

    info!(
        "Found {} markdown files under {}",
        documents.len(),
        source_dir.display()
    );

    Ok(documents)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}
