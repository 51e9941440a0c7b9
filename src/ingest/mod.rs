#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::AgentError;
use crate::chunking::chunk_text;
use crate::config::Config;
use crate::documents::{Document, discover_documents};
use crate::embeddings::ollama::OllamaClient;
use crate::store::qdrant::{ChunkPayload, PointRecord, QdrantStore, point_id};
use crate::store::sqlite::Database;
use crate::store::sqlite::models::NewDocumentRecord;

/// One-shot ingestion job: discover markdown documents, chunk them, embed
/// each chunk, and write the results to the vector store and the ledger.
///
/// Documents are processed strictly sequentially; the first failure aborts
/// the whole run. A missing or empty source directory is a warning, not an
/// error, so the host process can start up without documents.
pub struct IngestionPipeline {
    config: Config,
    ollama: OllamaClient,
    store: QdrantStore,
    ledger: Database,
}

/// Counters reported after a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub vectors: usize,
}

impl IngestionPipeline {
    #[inline]
    pub async fn new(config: Config) -> Result<Self> {
        let ollama = OllamaClient::new(&config).context("Failed to create Ollama client")?;
        let store = QdrantStore::new(&config).context("Failed to create Qdrant client")?;

        std::fs::create_dir_all(&config.base_dir).with_context(|| {
            format!("Failed to create base directory: {}", config.base_dir.display())
        })?;
        let ledger = Database::new(config.ledger_path())
            .await
            .context("Failed to open content ledger")?;

        Ok(Self {
            config,
            ollama,
            store,
            ledger,
        })
    }

    #[inline]
    pub async fn run(&self) -> Result<IngestReport> {
        // Chunking parameters are checked before any I/O happens.
        self.config
            .chunking
            .validate()
            .map_err(|e| AgentError::InvalidConfiguration(e.to_string()))?;

        info!(
            "Ingesting documents from: {}",
            self.config.sources.dir.display()
        );

        let documents = match discover_documents(&self.config.sources.dir) {
            Ok(documents) => documents,
            Err(AgentError::SourceNotFound(path)) => {
                warn!("Docs directory not found: {}", path.display());
                return Ok(IngestReport::default());
            }
            Err(AgentError::NoDocumentsFound(path)) => {
                warn!("No markdown files found to ingest under {}", path.display());
                return Ok(IngestReport::default());
            }
            Err(e) => return Err(e.into()),
        };

        self.store
            .ensure_collection()
            .context("Failed to prepare vector collection")?;

        let progress = ProgressBar::new(documents.len() as u64);
        let mut report = IngestReport::default();

        for document in &documents {
            info!("Ingesting: {}", document.name);

            let (chunks, vectors) = self
                .ingest_document(document)
                .await
                .with_context(|| format!("Failed to ingest document '{}'", document.name))?;

            report.documents += 1;
            report.chunks += chunks;
            report.vectors += vectors;
            progress.inc(1);
        }

        progress.finish_and_clear();

        info!(
            "Ingestion complete: {} documents, {} chunks, {} vectors written",
            report.documents, report.chunks, report.vectors
        );

        Ok(report)
    }

    async fn ingest_document(&self, document: &Document) -> Result<(usize, usize)> {
        let chunks = chunk_text(&document.name, &document.body, &self.config.chunking)
            .context("Chunking failed")?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .ollama
            .embed_batch(&texts)
            .context("Embedding failed")?;

        let points: Vec<PointRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| PointRecord {
                id: point_id(&document.name, chunk.chunk_index),
                vector,
                payload: ChunkPayload {
                    document_name: document.name.clone(),
                    chunk_index: chunk.chunk_index,
                    source: document
                        .metadata
                        .get("source")
                        .cloned()
                        .unwrap_or_else(|| document.name.clone()),
                    text: chunk.text.clone(),
                },
            })
            .collect();

        self.store
            .upsert_points(&points)
            .context("Vector store write failed")?;

        let record = NewDocumentRecord::with_metadata(
            document.name.clone(),
            document.path.display().to_string(),
            document.body.clone(),
            chunks.len() as i64,
            &document.metadata,
        );
        self.ledger
            .record_document(&record)
            .await
            .context("Ledger write failed")?;

        Ok((chunks.len(), points.len()))
    }
}
