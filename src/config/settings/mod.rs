
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 768;

/// Process-wide configuration, constructed once at startup and passed by
/// reference to the ingestion pipeline and the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub sources: SourceConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
}

impl Default for QdrantConfig {
    #[inline]
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            collection: "documents".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaConfig {
    pub url: String,
    pub embedding_model: String,
    pub embedding_dimension: u32,
    pub chat_model: String,
    pub temperature: f32,
}

impl Default for OllamaConfig {
    #[inline]
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            embedding_model: "embeddinggemma".to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            chat_model: "gpt-oss-safeguard:120b".to_string(),
            temperature: 0.3,
        }
    }
}

/// Sliding-window chunking parameters, in characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    pub dir: PathBuf,
}

impl Default for SourceConfig {
    #[inline]
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/app/documents"),
        }
    }
}

/// Retrieval tuning for the agent. A search is considered insufficient when
/// fewer than `min_results` hits score at or above `score_threshold`; the
/// agent reformulates and retries up to `max_search_attempts` total searches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub top_k: usize,
    pub min_results: usize,
    pub score_threshold: f32,
    pub max_search_attempts: u32,
}

impl Default for AgentConfig {
    #[inline]
    fn default() -> Self {
        Self {
            top_k: 5,
            min_results: 1,
            score_threshold: 0.35,
            max_search_attempts: 3,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid collection name: {0} (cannot be empty)")]
    InvalidCollection(String),
    #[error("Invalid embedding dimension: {0} (must be between 64 and 4096)")]
    InvalidEmbeddingDimension(u32),
    #[error("Invalid temperature: {0} (must be between 0.0 and 2.0)")]
    InvalidTemperature(f32),
    #[error("Invalid chunk size: {0} (must be greater than zero)")]
    InvalidChunkSize(usize),
    #[error("Invalid overlap: {0} (must be strictly less than chunk size {1})")]
    OverlapTooLarge(usize, usize),
    #[error("Invalid top_k: {0} (must be between 1 and 100)")]
    InvalidTopK(usize),
    #[error("Invalid min_results: {0} (must not exceed top_k {1})")]
    MinResultsExceedsTopK(usize, usize),
    #[error("Invalid score threshold: {0} (must be between 0.0 and 1.0)")]
    InvalidScoreThreshold(f32),
    #[error("Invalid max_search_attempts: {0} (must be between 1 and 10)")]
    InvalidSearchAttempts(u32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from `config.toml` under `config_dir`, falling
    /// back to defaults when the file does not exist. Environment overrides
    /// are applied after the file, then the result is validated.
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            toml::from_str::<Config>(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            Config::default()
        };

        config.base_dir = config_dir.as_ref().to_path_buf();
        config.apply_env_overrides();

        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }

    /// Load from the user's default configuration directory.
    #[inline]
    pub fn load_default() -> Result<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::load(config_dir)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.base_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("docs-agent"))
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }

    /// Path of the SQLite content ledger.
    #[inline]
    pub fn ledger_path(&self) -> PathBuf {
        self.base_dir.join("data.db")
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.qdrant.validate()?;
        self.ollama.validate()?;
        self.chunking.validate()?;
        self.agent.validate()?;
        Ok(())
    }

    /// The deployment this tool ships in is driven by environment variables,
    /// so a handful of them override the file-based configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("QDRANT_URL") {
            self.qdrant.url = url;
        }
        if let Ok(url) = env::var("OLLAMA_URL") {
            self.ollama.url = url;
        }
        if let Ok(dir) = env::var("DOCS_DIR") {
            self.sources.dir = PathBuf::from(dir);
        }
        if let Ok(collection) = env::var("COLLECTION_NAME") {
            self.qdrant.collection = collection;
        }
    }
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            qdrant: QdrantConfig::default(),
            ollama: OllamaConfig::default(),
            chunking: ChunkingConfig::default(),
            sources: SourceConfig::default(),
            agent: AgentConfig::default(),
            base_dir: PathBuf::new(),
        }
    }
}

impl QdrantConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_url()?;

        if self.collection.trim().is_empty() {
            return Err(ConfigError::InvalidCollection(self.collection.clone()));
        }

        Ok(())
    }

    pub fn parsed_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.url).map_err(|_| ConfigError::InvalidUrl(self.url.clone()))
    }
}

impl OllamaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_url()?;

        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.embedding_model.clone()));
        }

        if self.chat_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.chat_model.clone()));
        }

        if !(64..=4096).contains(&self.embedding_dimension) {
            return Err(ConfigError::InvalidEmbeddingDimension(
                self.embedding_dimension,
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        Ok(())
    }

    pub fn parsed_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.url).map_err(|_| ConfigError::InvalidUrl(self.url.clone()))
    }
}

impl ChunkingConfig {
    /// Chunking parameters are validated before any text is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }

        if self.overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge(self.overlap, self.chunk_size));
        }

        Ok(())
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 || self.top_k > 100 {
            return Err(ConfigError::InvalidTopK(self.top_k));
        }

        if self.min_results > self.top_k {
            return Err(ConfigError::MinResultsExceedsTopK(
                self.min_results,
                self.top_k,
            ));
        }

        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::InvalidScoreThreshold(self.score_threshold));
        }

        if self.max_search_attempts == 0 || self.max_search_attempts > 10 {
            return Err(ConfigError::InvalidSearchAttempts(self.max_search_attempts));
        }

        Ok(())
    }
}
