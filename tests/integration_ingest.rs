#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end ingestion tests against mocked Ollama and Qdrant backends.
// Run with: cargo test --test integration_ingest

use docs_agent::config::Config;
use docs_agent::ingest::{IngestReport, IngestionPipeline};
use docs_agent::store::sqlite::Database;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_DIMENSION: u32 = 8;

fn test_config(base_dir: &std::path::Path, source_dir: &std::path::Path, server: &MockServer) -> Config {
    let mut config = Config::default();
    config.base_dir = base_dir.to_path_buf();
    config.sources.dir = source_dir.to_path_buf();
    config.qdrant.url = server.uri();
    config.ollama.url = server.uri();
    config.ollama.embedding_dimension = TEST_DIMENSION;
    config
}

fn embedding() -> Vec<f32> {
    vec![0.1; TEST_DIMENSION as usize]
}

/// Mount the happy-path backend: the collection does not exist on the first
/// lookup, gets created, and accepts embeddings and point upserts.
async fn mount_happy_backend(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/collections/documents"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/collections/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "points_count": 0,
                "config": { "params": { "vectors": { "size": TEST_DIMENSION, "distance": "Cosine" } } }
            },
            "status": "ok",
            "time": 0.001
        })))
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/collections/documents"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": true, "status": "ok", "time": 0.001 })),
        )
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/collections/documents/points"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "operation_id": 0, "status": "completed" },
            "status": "ok",
            "time": 0.001
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [embedding()] })),
        )
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn ingests_documents_end_to_end() {
    let server = MockServer::start().await;
    mount_happy_backend(&server).await;

    let temp_dir = TempDir::new().expect("temp dir");
    let source_dir = temp_dir.path().join("documents");
    std::fs::create_dir_all(&source_dir).expect("source dir");
    std::fs::write(source_dir.join("a.md"), "# Alpha\n\nShort document.").expect("write");
    std::fs::write(source_dir.join("b.md"), "# Beta\n\nAnother short document.").expect("write");

    let pipeline = IngestionPipeline::new(test_config(temp_dir.path(), &source_dir, &server))
        .await
        .expect("pipeline");

    let report = pipeline.run().await.expect("run");
    assert_eq!(
        report,
        IngestReport {
            documents: 2,
            chunks: 2,
            vectors: 2,
        }
    );

    let ledger = Database::new(temp_dir.path().join("data.db"))
        .await
        .expect("ledger");
    assert_eq!(ledger.count_documents().await.expect("count"), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn short_document_produces_one_chunk_one_vector_one_ledger_entry() {
    let server = MockServer::start().await;
    mount_happy_backend(&server).await;

    let temp_dir = TempDir::new().expect("temp dir");
    let source_dir = temp_dir.path().join("documents");
    std::fs::create_dir_all(&source_dir).expect("source dir");

    // 500 characters with the default 1024/200 window: exactly one chunk.
    let body = "abcde".repeat(100);
    assert_eq!(body.len(), 500);
    std::fs::write(source_dir.join("a.md"), &body).expect("write");

    let config = test_config(temp_dir.path(), &source_dir, &server);
    assert_eq!(config.chunking.chunk_size, 1024);
    assert_eq!(config.chunking.overlap, 200);

    let pipeline = IngestionPipeline::new(config).await.expect("pipeline");
    let report = pipeline.run().await.expect("run");

    assert_eq!(
        report,
        IngestReport {
            documents: 1,
            chunks: 1,
            vectors: 1,
        }
    );

    let ledger = Database::new(temp_dir.path().join("data.db"))
        .await
        .expect("ledger");
    let record = ledger
        .get_document_by_name("a.md")
        .await
        .expect("get")
        .expect("a.md recorded");
    assert_eq!(record.body, body);
    assert_eq!(record.chunk_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn rerunning_ingestion_is_idempotent() {
    let server = MockServer::start().await;
    mount_happy_backend(&server).await;

    let temp_dir = TempDir::new().expect("temp dir");
    let source_dir = temp_dir.path().join("documents");
    std::fs::create_dir_all(&source_dir).expect("source dir");
    std::fs::write(source_dir.join("a.md"), "# Alpha").expect("write");

    let pipeline = IngestionPipeline::new(test_config(temp_dir.path(), &source_dir, &server))
        .await
        .expect("pipeline");

    let first = pipeline.run().await.expect("first run");
    let second = pipeline.run().await.expect("second run");
    assert_eq!(first, second);

    // The ledger upserts by name, so re-ingestion does not accumulate rows.
    let ledger = Database::new(temp_dir.path().join("data.db"))
        .await
        .expect("ledger");
    assert_eq!(ledger.count_documents().await.expect("count"), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn embedding_failure_aborts_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections/documents"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/collections/documents"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": true, "status": "ok", "time": 0.001 })),
        )
        .mount(&server)
        .await;
    // Non-retryable client error from the embedding endpoint.
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("temp dir");
    let source_dir = temp_dir.path().join("documents");
    std::fs::create_dir_all(&source_dir).expect("source dir");
    std::fs::write(source_dir.join("a.md"), "# Alpha").expect("write");

    let pipeline = IngestionPipeline::new(test_config(temp_dir.path(), &source_dir, &server))
        .await
        .expect("pipeline");

    let error = pipeline.run().await.expect_err("must abort");
    let message = format!("{error:#}");
    assert!(message.contains("a.md"), "error should name the document: {message}");

    // Nothing may reach the ledger when the document fails to embed.
    let ledger = Database::new(temp_dir.path().join("data.db"))
        .await
        .expect("ledger");
    assert_eq!(ledger.count_documents().await.expect("count"), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn store_failure_aborts_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections/documents"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/collections/documents"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": true, "status": "ok", "time": 0.001 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [embedding()] })),
        )
        .mount(&server)
        .await;
    // The upsert is rejected outright.
    Mock::given(method("PUT"))
        .and(path("/collections/documents/points"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("temp dir");
    let source_dir = temp_dir.path().join("documents");
    std::fs::create_dir_all(&source_dir).expect("source dir");
    std::fs::write(source_dir.join("a.md"), "# Alpha").expect("write");

    let pipeline = IngestionPipeline::new(test_config(temp_dir.path(), &source_dir, &server))
        .await
        .expect("pipeline");

    let error = pipeline.run().await.expect_err("must abort");
    assert!(format!("{error:#}").contains("a.md"));
}
