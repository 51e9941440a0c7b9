use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use console::style;
use tracing::{error, info, warn};

use crate::agent::RagAgent;
use crate::config::Config;
use crate::embeddings::ollama::OllamaClient;
use crate::ingest::IngestionPipeline;
use crate::store::qdrant::QdrantStore;
use crate::store::sqlite::Database;

/// Run the one-shot ingestion job to completion.
#[inline]
pub async fn ingest(config: Config) -> Result<()> {
    info!("Starting document ingestion...");

    let pipeline = IngestionPipeline::new(config)
        .await
        .context("Failed to initialize ingestion pipeline")?;

    let report = pipeline.run().await?;

    if report.documents == 0 {
        println!("No documents were ingested.");
    } else {
        println!("Ingestion complete!");
        println!("  Documents: {}", report.documents);
        println!("  Chunks: {}", report.chunks);
        println!("  Vectors written: {}", report.vectors);
    }

    info!("Ingestion finished");
    Ok(())
}

/// Interactive question-answering loop over stdin/stdout.
///
/// Any free-text line is answered; `exit` or `quit` (case-insensitive) or
/// end-of-input terminates the loop. A failed query is reported and the
/// loop keeps accepting the next one.
#[inline]
pub fn chat(config: &Config) -> Result<()> {
    match OllamaClient::new(config)?.health_check() {
        Ok(()) => {}
        Err(e) => {
            warn!("Ollama health check failed: {e:#}");
            println!("Warning: Ollama may not be ready. Queries may fail.");
        }
    }

    let agent = RagAgent::new(config).context("Failed to initialize agent")?;

    println!("Ask questions about your documents. Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\nUser: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        match agent.answer(query) {
            Ok(answer) => {
                println!("\n{}", answer.text);
                if !answer.citations.is_empty() {
                    println!(
                        "\n{} {}",
                        style("Sources:").bold(),
                        answer.citations.join(", ")
                    );
                }
            }
            Err(e) => {
                error!("Query failed: {e}");
                eprintln!("{} {e}", style("✗").red());
            }
        }
    }

    Ok(())
}

/// Connectivity and ingestion status report.
#[inline]
pub async fn show_status(config: Config) -> Result<()> {
    println!("📊 Docs Agent Status");
    println!("{}", "=".repeat(50));
    println!();

    println!("⚙️  Configuration:");
    println!("   Source directory: {}", config.sources.dir.display());
    println!("   Collection: {}", config.qdrant.collection);
    println!(
        "   Embedding: {} ({} dimensions)",
        config.ollama.embedding_model, config.ollama.embedding_dimension
    );
    println!("   Chat model: {}", config.ollama.chat_model);

    println!();
    println!("🤖 Ollama Status:");
    match OllamaClient::new(&config) {
        Ok(client) => match client.health_check() {
            Ok(()) => println!("   ✅ Ollama: Connected ({})", config.ollama.url),
            Err(e) => println!("   ⚠️  Ollama: Reachable but unhealthy - {e:#}"),
        },
        Err(e) => println!("   ❌ Ollama: Failed to initialize client - {e:#}"),
    }

    println!();
    println!("🔍 Qdrant Status:");
    match QdrantStore::new(&config) {
        Ok(store) => match store.ping() {
            Ok(()) => {
                println!("   ✅ Qdrant: Connected ({})", config.qdrant.url);
                match store.collection_info() {
                    Ok(info) => println!(
                        "   📄 Collection '{}': {} points",
                        config.qdrant.collection, info.points_count
                    ),
                    Err(_) => println!(
                        "   📭 Collection '{}' does not exist yet",
                        config.qdrant.collection
                    ),
                }
            }
            Err(e) => println!("   ❌ Qdrant: Failed to connect - {e:#}"),
        },
        Err(e) => println!("   ❌ Qdrant: Failed to initialize client - {e:#}"),
    }

    println!();
    println!("🗄️  Content Ledger:");
    std::fs::create_dir_all(&config.base_dir).ok();
    match Database::new(config.ledger_path()).await {
        Ok(database) => match database.list_documents().await {
            Ok(records) => {
                println!("   ✅ Ledger: {} documents recorded", records.len());
                for record in records.iter().take(5) {
                    println!("      • {} ({} chunks)", record.name, record.chunk_count);
                }
                if records.len() > 5 {
                    println!("      … and {} more", records.len() - 5);
                }
            }
            Err(e) => println!("   ⚠️  Ledger: Connected but unreadable - {e:#}"),
        },
        Err(e) => println!("   ❌ Ledger: Failed to open - {e:#}"),
    }

    println!();
    println!("💡 Next Steps:");
    println!("   • Use 'docs-agent ingest' to load markdown documents");
    println!("   • Use 'docs-agent chat' to ask questions about them");

    Ok(())
}
