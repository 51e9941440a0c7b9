use clap::{Parser, Subcommand};
use docs_agent::Result;
use docs_agent::commands::{chat, ingest, show_status};
use docs_agent::config::{Config, run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "docs-agent")]
#[command(about = "Ingest local markdown into a vector database and chat with it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest markdown documents from the source directory
    Ingest,
    /// Start the interactive question-answering loop
    Chat,
    /// Show connectivity and ingestion status
    Status,
    /// Configure Qdrant/Ollama connections and ingestion settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest => {
            let config = Config::load_default()?;
            ingest(config).await?;
        }
        Commands::Chat => {
            let config = Config::load_default()?;
            chat(&config)?;
        }
        Commands::Status => {
            let config = Config::load_default()?;
            show_status(config).await?;
        }
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["docs-agent", "ingest"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Ingest);
        }
    }

    #[test]
    fn chat_command() {
        let cli = Cli::try_parse_from(["docs-agent", "chat"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Chat);
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["docs-agent", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["docs-agent", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["docs-agent", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
