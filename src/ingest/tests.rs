use super::*;
use tempfile::TempDir;

/// Config pointing at unreachable backends; tests below must finish before
/// any network call is attempted.
fn offline_config(base_dir: &std::path::Path, source_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.base_dir = base_dir.to_path_buf();
    config.sources.dir = source_dir.to_path_buf();
    config.qdrant.url = "http://127.0.0.1:1".to_string();
    config.ollama.url = "http://127.0.0.1:1".to_string();
    config
}

#[tokio::test]
async fn missing_source_directory_is_a_no_op() {
    let temp_dir = TempDir::new().expect("temp dir");
    let missing = temp_dir.path().join("does-not-exist");

    let pipeline = IngestionPipeline::new(offline_config(temp_dir.path(), &missing))
        .await
        .expect("pipeline");

    let report = pipeline.run().await.expect("run");
    assert_eq!(report, IngestReport::default());
}

#[tokio::test]
async fn empty_source_directory_is_a_no_op() {
    let temp_dir = TempDir::new().expect("temp dir");
    let source_dir = temp_dir.path().join("documents");
    std::fs::create_dir_all(&source_dir).expect("create source dir");
    std::fs::write(source_dir.join("notes.txt"), "not markdown").expect("write file");

    let pipeline = IngestionPipeline::new(offline_config(temp_dir.path(), &source_dir))
        .await
        .expect("pipeline");

    let report = pipeline.run().await.expect("run");
    assert_eq!(report, IngestReport::default());
}

#[tokio::test]
async fn invalid_chunking_fails_before_any_io() {
    let temp_dir = TempDir::new().expect("temp dir");
    let source_dir = temp_dir.path().join("documents");
    std::fs::create_dir_all(&source_dir).expect("create source dir");
    std::fs::write(source_dir.join("a.md"), "# Alpha").expect("write file");

    let mut config = offline_config(temp_dir.path(), &source_dir);
    config.chunking.chunk_size = 100;
    config.chunking.overlap = 100;

    let pipeline = IngestionPipeline::new(config).await.expect("pipeline");

    let error = pipeline.run().await.expect_err("must fail");
    let agent_error = error.downcast_ref::<AgentError>().expect("agent error");
    assert!(matches!(agent_error, AgentError::InvalidConfiguration(_)));
}
