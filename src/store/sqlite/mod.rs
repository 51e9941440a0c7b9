use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::debug;

use crate::store::sqlite::models::{DocumentRecord, NewDocumentRecord};
use crate::store::sqlite::queries::DocumentQueries;


pub mod models;
pub mod queries;

pub type DbPool = Pool<Sqlite>;

/// Content ledger: one row per ingested document, kept for auditability.
#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let database = Self { pool };
        database.create_schema().await?;

        Ok(database)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn create_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                path TEXT NOT NULL,
                body TEXT NOT NULL,
                chunk_count INTEGER NOT NULL,
                metadata_json TEXT NOT NULL,
                ingested_date DATETIME NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create ledger schema")?;

        debug!("Content ledger schema is ready");
        Ok(())
    }

    /// Record an ingested document, replacing any earlier entry of the
    /// same name so re-ingestion stays idempotent.
    pub async fn record_document(&self, document: &NewDocumentRecord) -> Result<DocumentRecord> {
        DocumentQueries::upsert(&self.pool, document).await
    }

    pub async fn get_document_by_name(&self, name: &str) -> Result<Option<DocumentRecord>> {
        DocumentQueries::get_by_name(&self.pool, name).await
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentRecord>> {
        DocumentQueries::list_all(&self.pool).await
    }

    pub async fn count_documents(&self) -> Result<i64> {
        DocumentQueries::count(&self.pool).await
    }
}
