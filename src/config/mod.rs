// Configuration management module
// Handles the TOML configuration file, validation, and environment overrides

pub mod interactive;
pub mod settings;

#[cfg(test)]
mod tests;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    AgentConfig, ChunkingConfig, Config, ConfigError, OllamaConfig, QdrantConfig, SourceConfig,
};

/// Get the default configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::default_config_dir()
}
