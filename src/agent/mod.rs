
pub mod prompt;

use anyhow::{Context, Result};
use itertools::Itertools;
use tracing::{debug, info};

use crate::config::{AgentConfig, Config};
use crate::embeddings::ollama::OllamaClient;
use crate::store::qdrant::{QdrantStore, ScoredPoint};

pub use prompt::NO_RESULTS_ANSWER;

/// A synthesized answer plus the documents the context was drawn from.
///
/// Citations come from the retrieved passages, never from the model's own
/// output, so an answer can only cite documents that were actually in the
/// collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<String>,
}

/// Retrieval-augmented agent: per query it embeds the question, searches the
/// vector store (reformulating a bounded number of times when retrieval is
/// insufficient), then asks the chat model to synthesize an answer from the
/// retrieved passages.
pub struct RagAgent {
    ollama: OllamaClient,
    store: QdrantStore,
    settings: AgentConfig,
}

impl RagAgent {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let ollama = OllamaClient::new(config).context("Failed to create Ollama client")?;
        let store = QdrantStore::new(config).context("Failed to create Qdrant client")?;

        Ok(Self {
            ollama,
            store,
            settings: config.agent.clone(),
        })
    }

    /// Answer one query to completion.
    #[inline]
    pub fn answer(&self, query: &str) -> crate::Result<Answer> {
        let hits = self.search_with_reformulation(query)?;

        if hits.is_empty() {
            info!("No relevant passages found after all search attempts");
            return Ok(Answer {
                text: NO_RESULTS_ANSWER.to_string(),
                citations: Vec::new(),
            });
        }

        let context = prompt::build_context(&hits);
        let full_prompt = prompt::build_prompt(query, &context);
        let text = self.ollama.generate(&full_prompt)?;

        let citations: Vec<String> = hits
            .iter()
            .map(|hit| hit.payload.document_name.clone())
            .unique()
            .collect();

        Ok(Answer { text, citations })
    }

    /// Search the store, broadening the query up to the configured number of
    /// attempts when fewer than `min_results` hits clear the score threshold.
    fn search_with_reformulation(&self, query: &str) -> crate::Result<Vec<ScoredPoint>> {
        let mut current = query.to_string();

        for attempt in 1..=self.settings.max_search_attempts {
            let vector = self.ollama.embed(&current)?;
            let hits = self.store.search(&vector, self.settings.top_k)?;

            let relevant: Vec<ScoredPoint> = hits
                .into_iter()
                .filter(|hit| hit.score >= self.settings.score_threshold)
                .collect();

            if relevant.len() >= self.settings.min_results {
                debug!(
                    "Search attempt {} returned {} relevant passages",
                    attempt,
                    relevant.len()
                );
                return Ok(relevant);
            }

            debug!(
                "Search attempt {}/{} insufficient ({} relevant hits)",
                attempt,
                self.settings.max_search_attempts,
                relevant.len()
            );

            if attempt < self.settings.max_search_attempts {
                current = self.reformulate(query, &current)?;
                info!("Retrying search with reformulated query: {}", current);
            }
        }

        Ok(Vec::new())
    }

    fn reformulate(&self, original: &str, previous: &str) -> crate::Result<String> {
        let reformulated = self
            .ollama
            .generate(&prompt::build_reformulation_prompt(original, previous))?;

        Ok(first_usable_line(&reformulated).unwrap_or_else(|| original.to_string()))
    }
}

/// Models occasionally wrap the rewritten query in blank lines or quotes;
/// take the first non-empty line, unquoted.
fn first_usable_line(response: &str) -> Option<String> {
    response
        .lines()
        .map(|line| line.trim().trim_matches('"').trim())
        .find(|line| !line.is_empty())
        .map(ToString::to_string)
}
