use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};

use crate::embeddings::ollama::OllamaClient;
use crate::store::qdrant::QdrantStore;

use super::{Config, ConfigError};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Docs Agent Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Qdrant Configuration").bold().yellow());
    configure_qdrant(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Ollama Configuration").bold().yellow());
    configure_ollama(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Ingestion Configuration").bold().yellow());
    configure_ingestion(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_ollama_connection(&config) {
        eprintln!("{}", style("✓ Ollama connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Ollama").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before ingesting.");
    }

    if test_qdrant_connection(&config) {
        eprintln!("{}", style("✓ Qdrant connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Qdrant").yellow()
        );
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Qdrant Settings:").bold().yellow());
    eprintln!("  URL: {}", style(&config.qdrant.url).cyan());
    eprintln!("  Collection: {}", style(&config.qdrant.collection).cyan());

    eprintln!();
    eprintln!("{}", style("Ollama Settings:").bold().yellow());
    eprintln!("  URL: {}", style(&config.ollama.url).cyan());
    eprintln!(
        "  Embedding Model: {} ({} dimensions)",
        style(&config.ollama.embedding_model).cyan(),
        style(config.ollama.embedding_dimension).cyan()
    );
    eprintln!("  Chat Model: {}", style(&config.ollama.chat_model).cyan());
    eprintln!("  Temperature: {}", style(config.ollama.temperature).cyan());

    eprintln!();
    eprintln!("{}", style("Ingestion Settings:").bold().yellow());
    eprintln!(
        "  Source Directory: {}",
        style(config.sources.dir.display()).cyan()
    );
    eprintln!(
        "  Chunk Size: {} characters",
        style(config.chunking.chunk_size).cyan()
    );
    eprintln!(
        "  Overlap: {} characters",
        style(config.chunking.overlap).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Agent Settings:").bold().yellow());
    eprintln!("  Top K: {}", style(config.agent.top_k).cyan());
    eprintln!(
        "  Score Threshold: {}",
        style(config.agent.score_threshold).cyan()
    );
    eprintln!(
        "  Max Search Attempts: {}",
        style(config.agent.max_search_attempts).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
    eprintln!(
        "Content ledger: {}",
        style(config.ledger_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    Config::load_default().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            let mut config = Config::default();
            config.base_dir = Config::default_config_dir()?;
            Ok(config)
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_qdrant(config: &mut Config) -> Result<()> {
    config.qdrant.url = Input::new()
        .with_prompt("Qdrant URL")
        .default(config.qdrant.url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|_| ConfigError::InvalidUrl(input.clone()))
        })
        .interact_text()?;

    config.qdrant.collection = Input::new()
        .with_prompt("Collection name")
        .default(config.qdrant.collection.clone())
        .interact_text()?;

    Ok(())
}

fn configure_ollama(config: &mut Config) -> Result<()> {
    config.ollama.url = Input::new()
        .with_prompt("Ollama URL")
        .default(config.ollama.url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|_| ConfigError::InvalidUrl(input.clone()))
        })
        .interact_text()?;

    config.ollama.embedding_model = Input::new()
        .with_prompt("Embedding model")
        .default(config.ollama.embedding_model.clone())
        .interact_text()?;

    config.ollama.embedding_dimension = Input::new()
        .with_prompt("Embedding dimension")
        .default(config.ollama.embedding_dimension)
        .validate_with(|input: &u32| -> Result<(), ConfigError> {
            if (64..=4096).contains(input) {
                Ok(())
            } else {
                Err(ConfigError::InvalidEmbeddingDimension(*input))
            }
        })
        .interact_text()?;

    config.ollama.chat_model = Input::new()
        .with_prompt("Chat model")
        .default(config.ollama.chat_model.clone())
        .interact_text()?;

    config.ollama.temperature = Input::new()
        .with_prompt("Temperature")
        .default(config.ollama.temperature)
        .validate_with(|input: &f32| -> Result<(), ConfigError> {
            if (0.0..=2.0).contains(input) {
                Ok(())
            } else {
                Err(ConfigError::InvalidTemperature(*input))
            }
        })
        .interact_text()?;

    Ok(())
}

fn configure_ingestion(config: &mut Config) -> Result<()> {
    let dir: String = Input::new()
        .with_prompt("Source documents directory")
        .default(config.sources.dir.display().to_string())
        .interact_text()?;
    config.sources.dir = dir.into();

    config.chunking.chunk_size = Input::new()
        .with_prompt("Chunk size (characters)")
        .default(config.chunking.chunk_size)
        .validate_with(|input: &usize| -> Result<(), ConfigError> {
            if *input == 0 {
                Err(ConfigError::InvalidChunkSize(*input))
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let chunk_size = config.chunking.chunk_size;
    config.chunking.overlap = Input::new()
        .with_prompt("Chunk overlap (characters)")
        .default(config.chunking.overlap.min(chunk_size.saturating_sub(1)))
        .validate_with(move |input: &usize| -> Result<(), ConfigError> {
            if *input >= chunk_size {
                Err(ConfigError::OverlapTooLarge(*input, chunk_size))
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    Ok(())
}

fn test_ollama_connection(config: &Config) -> bool {
    OllamaClient::new(config)
        .and_then(|client| client.ping())
        .is_ok()
}

fn test_qdrant_connection(config: &Config) -> bool {
    QdrantStore::new(config)
        .and_then(|store| store.ping())
        .is_ok()
}
