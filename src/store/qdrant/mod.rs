#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::AgentError;
use crate::config::Config;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// REST client for a single Qdrant collection of chunk vectors.
#[derive(Debug, Clone)]
pub struct QdrantStore {
    base_url: Url,
    collection: String,
    vector_dimension: usize,
    agent: ureq::Agent,
    retry_attempts: u32,
}

/// Payload stored alongside each vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub document_name: String,
    pub chunk_index: usize,
    pub source: String,
    pub text: String,
}

/// A vector record ready for upsert.
#[derive(Debug, Clone)]
pub struct PointRecord {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

/// A single search hit, ranked by similarity.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredPoint {
    pub score: f32,
    pub payload: ChunkPayload,
}

#[derive(Debug, Clone, Copy)]
pub struct CollectionInfo {
    pub points_count: u64,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize, Deserialize)]
struct VectorParams {
    size: usize,
    distance: String,
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    points: Vec<PointWire>,
}

#[derive(Debug, Serialize)]
struct PointWire {
    id: Uuid,
    vector: Vec<f32>,
    payload: ChunkPayload,
}

#[derive(Debug, Serialize)]
struct SearchRequest {
    vector: Vec<f32>,
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct CollectionDescription {
    points_count: Option<u64>,
    config: Option<CollectionConfig>,
}

#[derive(Debug, Deserialize)]
struct CollectionConfig {
    params: Option<CollectionParams>,
}

#[derive(Debug, Deserialize)]
struct CollectionParams {
    vectors: Option<VectorParams>,
}

/// Deterministic point id for a chunk, derived from its document name and
/// index. Re-ingesting the same document overwrites its points in place
/// instead of accumulating duplicates.
pub fn point_id(document_name: &str, chunk_index: usize) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("{document_name}:{chunk_index}").as_bytes(),
    )
}

impl QdrantStore {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .qdrant
            .parsed_url()
            .context("Failed to parse Qdrant URL from config")?;

        Ok(Self {
            base_url,
            collection: config.qdrant.collection.clone(),
            vector_dimension: config.ollama.embedding_dimension as usize,
            agent: ureq::Agent::config_builder()
                .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
                .build()
                .into(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    #[inline]
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Check that the Qdrant server is reachable.
    #[inline]
    pub fn ping(&self) -> Result<()> {
        let url = self.api_url("/collections")?;

        self.agent
            .get(url.as_str())
            .call()
            .map(|_| ())
            .with_context(|| format!("Failed to reach Qdrant at {}", self.base_url))
    }

    /// Create the collection if it does not exist yet.
    ///
    /// An existing collection is left untouched, but its vector dimension is
    /// checked against the configured embedding dimension so vectors from a
    /// different model can never be mixed in.
    #[inline]
    pub fn ensure_collection(&self) -> crate::Result<()> {
        let url = self.collection_url("")?;

        match self.agent.get(url.as_str()).call() {
            Ok(mut resp) => {
                let body = resp.body_mut().read_to_string().map_err(|e| {
                    AgentError::Store(format!("Failed to read collection info: {e}"))
                })?;
                self.check_existing_dimension(&body)?;
                debug!("Collection '{}' already exists", self.collection);
                Ok(())
            }
            Err(ureq::Error::StatusCode(404)) => self.create_collection(),
            Err(e) => Err(AgentError::Store(format!(
                "Failed to query collection '{}': {e}",
                self.collection
            ))),
        }
    }

    fn create_collection(&self) -> crate::Result<()> {
        info!(
            "Creating collection '{}' ({} dimensions, cosine distance)",
            self.collection, self.vector_dimension
        );

        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: self.vector_dimension,
                distance: "Cosine".to_string(),
            },
        };

        self.put_json("", &request)
            .map(|_| ())
            .map_err(|e| AgentError::Store(format!("Failed to create collection: {e:#}")))
    }

    fn check_existing_dimension(&self, body: &str) -> crate::Result<()> {
        let description: ApiResponse<CollectionDescription> = match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Could not parse collection info: {e}");
                return Ok(());
            }
        };

        let existing = description
            .result
            .config
            .and_then(|c| c.params)
            .and_then(|p| p.vectors)
            .map(|v| v.size);

        match existing {
            Some(size) if size != self.vector_dimension => Err(AgentError::Store(format!(
                "Collection '{}' holds {size}-dimensional vectors but the configured embedding dimension is {}",
                self.collection, self.vector_dimension
            ))),
            _ => Ok(()),
        }
    }

    /// Upsert a batch of vector records, waiting for the write to land.
    #[inline]
    pub fn upsert_points(&self, points: &[PointRecord]) -> crate::Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        for point in points {
            if point.vector.len() != self.vector_dimension {
                return Err(AgentError::Store(format!(
                    "Rejecting point {} with {} dimensions (collection expects {})",
                    point.id,
                    point.vector.len(),
                    self.vector_dimension
                )));
            }
        }

        let request = UpsertRequest {
            points: points
                .iter()
                .map(|p| PointWire {
                    id: p.id,
                    vector: p.vector.clone(),
                    payload: p.payload.clone(),
                })
                .collect(),
        };

        self.put_json("/points?wait=true", &request)
            .map(|_| ())
            .map_err(|e| AgentError::Store(format!("Failed to upsert points: {e:#}")))?;

        debug!(
            "Upserted {} points into '{}'",
            points.len(),
            self.collection
        );
        Ok(())
    }

    /// Nearest-neighbor search, returning hits ordered by descending score.
    #[inline]
    pub fn search(&self, vector: &[f32], limit: usize) -> crate::Result<Vec<ScoredPoint>> {
        let request = SearchRequest {
            vector: vector.to_vec(),
            limit,
            with_payload: true,
        };

        let body = self
            .post_json("/points/search", &request)
            .map_err(|e| AgentError::Store(format!("Search failed: {e:#}")))?;

        let response: ApiResponse<Vec<ScoredPoint>> = serde_json::from_str(&body)
            .map_err(|e| AgentError::Store(format!("Malformed search response: {e}")))?;

        debug!(
            "Search in '{}' returned {} hits",
            self.collection,
            response.result.len()
        );
        Ok(response.result)
    }

    /// Point count for status reporting.
    #[inline]
    pub fn collection_info(&self) -> crate::Result<CollectionInfo> {
        let url = self.collection_url("")?;

        let body = self
            .request_with_retry(|| {
                self.agent
                    .get(url.as_str())
                    .call()
                    .and_then(|mut resp| resp.body_mut().read_to_string())
            })
            .map_err(|e| AgentError::Store(format!("Failed to fetch collection info: {e:#}")))?;

        let description: ApiResponse<CollectionDescription> = serde_json::from_str(&body)
            .map_err(|e| AgentError::Store(format!("Malformed collection info: {e}")))?;

        Ok(CollectionInfo {
            points_count: description.result.points_count.unwrap_or(0),
        })
    }

    fn put_json<T: Serialize>(&self, path: &str, request: &T) -> Result<String> {
        let url = self.collection_url(path)?;
        let request_json = serde_json::to_string(request).context("Failed to serialize request")?;

        self.request_with_retry(|| {
            self.agent
                .put(url.as_str())
                .header("Content-Type", "application/json")
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
    }

    fn post_json<T: Serialize>(&self, path: &str, request: &T) -> Result<String> {
        let url = self.collection_url(path)?;
        let request_json = serde_json::to_string(request).context("Failed to serialize request")?;

        self.request_with_retry(|| {
            self.agent
                .post(url.as_str())
                .header("Content-Type", "application/json")
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
    }

    fn collection_url(&self, path: &str) -> Result<Url> {
        self.api_url(&format!("/collections/{}{}", self.collection, path))
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build URL for {path}"))
    }

    fn request_with_retry<F>(&self, mut request_fn: F) -> Result<String>
    where
        F: FnMut() -> Result<String, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            match request_fn() {
                Ok(response_text) => return Ok(response_text),
                Err(error) => {
                    let retryable = matches!(
                        &error,
                        ureq::Error::ConnectionFailed
                            | ureq::Error::HostNotFound
                            | ureq::Error::Timeout(_)
                            | ureq::Error::Io(_)
                    ) || matches!(&error, ureq::Error::StatusCode(status) if *status >= 500);

                    if !retryable {
                        return Err(anyhow::anyhow!("Request failed: {}", error));
                    }

                    warn!(
                        "Qdrant request failed ({}), attempt {}/{}",
                        error, attempt, self.retry_attempts
                    );
                    last_error = Some(anyhow::anyhow!("Request error: {}", error));

                    if attempt < self.retry_attempts {
                        std::thread::sleep(Duration::from_millis(500 * u64::from(attempt)));
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Request failed after retries")))
    }
}
