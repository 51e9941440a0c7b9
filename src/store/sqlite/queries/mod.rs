
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;

use super::models::{DocumentRecord, NewDocumentRecord};

pub struct DocumentQueries;

impl DocumentQueries {
    /// Insert or replace the ledger entry for a document name.
    #[inline]
    pub async fn upsert(pool: &SqlitePool, document: &NewDocumentRecord) -> Result<DocumentRecord> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO documents (name, path, body, chunk_count, metadata_json, ingested_date)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                path = excluded.path,
                body = excluded.body,
                chunk_count = excluded.chunk_count,
                metadata_json = excluded.metadata_json,
                ingested_date = excluded.ingested_date
            "#,
        )
        .bind(&document.name)
        .bind(&document.path)
        .bind(&document.body)
        .bind(document.chunk_count)
        .bind(&document.metadata_json)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to upsert document record")?;

        Self::get_by_name(pool, &document.name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve upserted document record"))
    }

    #[inline]
    pub async fn get_by_name(pool: &SqlitePool, name: &str) -> Result<Option<DocumentRecord>> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, name, path, body, chunk_count, metadata_json, ingested_date
             FROM documents WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("Failed to get document by name")?;

        Ok(record)
    }

    #[inline]
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<DocumentRecord>> {
        let records = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, name, path, body, chunk_count, metadata_json, ingested_date
             FROM documents ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .context("Failed to list documents")?;

        Ok(records)
    }

    #[inline]
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(pool)
            .await
            .context("Failed to count documents")?;

        Ok(count)
    }
}
