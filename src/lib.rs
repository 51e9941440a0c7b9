use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("No documents found under: {0}")]
    NoDocumentsFound(PathBuf),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Language model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod agent;
pub mod chunking;
pub mod commands;
pub mod config;
pub mod documents;
pub mod embeddings;
pub mod ingest;
pub mod store;
