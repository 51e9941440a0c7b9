
use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A ledger row for one ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DocumentRecord {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub body: String,
    pub chunk_count: i64,
    pub metadata_json: String,
    pub ingested_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocumentRecord {
    pub name: String,
    pub path: String,
    pub body: String,
    pub chunk_count: i64,
    pub metadata_json: String,
}

impl DocumentRecord {
    /// Parse the stored metadata column back into a map.
    #[inline]
    pub fn metadata(&self) -> BTreeMap<String, String> {
        serde_json::from_str(&self.metadata_json).unwrap_or_default()
    }
}

impl NewDocumentRecord {
    #[inline]
    pub fn with_metadata(
        name: String,
        path: String,
        body: String,
        chunk_count: i64,
        metadata: &BTreeMap<String, String>,
    ) -> Self {
        Self {
            name,
            path,
            body,
            chunk_count,
            metadata_json: serde_json::to_string(metadata).unwrap_or_else(|_| "{}".to_string()),
        }
    }
}
