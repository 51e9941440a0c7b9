use super::*;
use crate::config::Config;

fn test_config() -> Config {
    let mut config = Config::default();
    config.qdrant.url = "http://qdrant-host:6333".to_string();
    config.qdrant.collection = "test-collection".to_string();
    config.ollama.embedding_dimension = 8;
    config
}

#[test]
fn store_configuration() {
    let store = QdrantStore::new(&test_config()).expect("Failed to create store");

    assert_eq!(store.collection_name(), "test-collection");
    assert_eq!(store.vector_dimension, 8);
    assert_eq!(store.base_url.host_str(), Some("qdrant-host"));
    assert_eq!(store.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn store_builder_methods() {
    let store = QdrantStore::new(&test_config())
        .expect("Failed to create store")
        .with_retry_attempts(5);

    assert_eq!(store.retry_attempts, 5);
}

#[test]
fn point_ids_are_deterministic() {
    let first = point_id("a.md", 0);
    let second = point_id("a.md", 0);

    assert_eq!(first, second);
}

#[test]
fn point_ids_differ_by_document_and_index() {
    assert_ne!(point_id("a.md", 0), point_id("a.md", 1));
    assert_ne!(point_id("a.md", 0), point_id("b.md", 0));
    // The separator keeps "doc1" + chunk 12 distinct from "doc11" + chunk 2.
    assert_ne!(point_id("doc1", 12), point_id("doc11", 2));
}

#[test]
fn payload_round_trips_through_json() {
    let payload = ChunkPayload {
        document_name: "guide/setup.md".to_string(),
        chunk_index: 3,
        source: "guide/setup.md".to_string(),
        text: "Install the dependencies first.".to_string(),
    };

    let json = serde_json::to_string(&payload).expect("serialize");
    let back: ChunkPayload = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, payload);
}

#[test]
fn upsert_rejects_mismatched_vector_dimension() {
    let store = QdrantStore::new(&test_config()).expect("Failed to create store");

    let point = PointRecord {
        id: point_id("a.md", 0),
        vector: vec![0.0; 16],
        payload: ChunkPayload {
            document_name: "a.md".to_string(),
            chunk_index: 0,
            source: "a.md".to_string(),
            text: "text".to_string(),
        },
    };

    let result = store.upsert_points(&[point]);
    assert!(matches!(result, Err(AgentError::Store(_))));
}

#[test]
fn search_response_parses_qdrant_wire_format() {
    let body = r#"{
        "result": [
            {
                "id": "5b94b5a2-8bb9-5f5b-8c3f-62b0b0f5a8f1",
                "version": 3,
                "score": 0.87,
                "payload": {
                    "document_name": "b.md",
                    "chunk_index": 0,
                    "source": "b.md",
                    "text": "The answer lives here."
                }
            }
        ],
        "status": "ok",
        "time": 0.001
    }"#;

    let response: ApiResponse<Vec<ScoredPoint>> = serde_json::from_str(body).expect("parse");
    assert_eq!(response.result.len(), 1);
    assert!((response.result[0].score - 0.87).abs() < 1e-6);
    assert_eq!(response.result[0].payload.document_name, "b.md");
}
