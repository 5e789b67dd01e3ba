#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Ollama client tests against a mock HTTP server

use serde_json::json;
use sheet_insights::config::EmbeddingConfig;
use sheet_insights::embeddings::{Embedder, OllamaClient};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, model: &str, batch_size: u32) -> OllamaClient {
    let config = EmbeddingConfig {
        host: server.address().ip().to_string(),
        port: server.address().port(),
        model: model.to_string(),
        batch_size,
        ..EmbeddingConfig::default()
    };

    OllamaClient::new(&config)
        .expect("Failed to create Ollama client")
        .with_timeout(Duration::from_secs(5))
        .with_retry_attempts(3)
        .with_retry_delay(Duration::from_millis(1))
}

#[tokio::test(flavor = "multi_thread")]
async fn batches_follow_configured_size() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({
            "model": "all-minilm",
            "input": ["first", "second"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "all-minilm",
            "embeddings": [[1.0, 0.0], [0.0, 1.0]],
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({ "input": ["third"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "all-minilm",
            "embeddings": [[0.5, 0.5]],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "all-minilm", 2);
    let embeddings = tokio::task::spawn_blocking(move || {
        let texts = vec![
            "first".to_string(),
            "second".to_string(),
            "third".to_string(),
        ];
        client.embed_batch(&texts)
    })
    .await
    .expect("blocking task should finish")
    .expect("embedding should succeed");

    assert_eq!(
        embeddings,
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn single_embedding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({ "input": ["How many rows?"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.1, 0.2, 0.3]],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "all-minilm", 16);
    let embedding = tokio::task::spawn_blocking(move || client.embed("How many rows?"))
        .await
        .expect("blocking task should finish")
        .expect("embedding should succeed");

    assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 2.0]],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "all-minilm", 16);
    let embedding = tokio::task::spawn_blocking(move || client.embed("retry me"))
        .await
        .expect("blocking task should finish")
        .expect("second attempt should succeed");

    assert_eq!(embedding, vec![1.0, 2.0]);
}

#[tokio::test(flavor = "multi_thread")]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "model not found" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "missing-model", 16);
    let result = tokio::task::spawn_blocking(move || client.embed("anything"))
        .await
        .expect("blocking task should finish");

    let error = result.expect_err("404 should fail");
    assert!(format!("{error:#}").contains("404"));
}

#[tokio::test(flavor = "multi_thread")]
async fn response_count_mismatch_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0], [2.0]],
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "all-minilm", 16);
    let result = tokio::task::spawn_blocking(move || client.embed("one text"))
        .await
        .expect("blocking task should finish");

    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn model_listing_and_validation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "all-minilm:latest", "size": 45_960_996, "digest": "1b226e2802db" },
                { "name": "nomic-embed-text:v1.5" },
            ],
        })))
        .mount(&server)
        .await;

    let bare_name = client_for(&server, "all-minilm", 16);
    let tagged = client_for(&server, "nomic-embed-text:v1.5", 16);
    let missing = client_for(&server, "mxbai-embed-large", 16);

    tokio::task::spawn_blocking(move || {
        let models = bare_name.list_models().expect("listing should succeed");
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].size, Some(45_960_996));

        assert!(bare_name.health_check().is_ok());
        assert!(tagged.validate_model().is_ok());
        assert!(missing.validate_model().is_err());
    })
    .await
    .expect("blocking task should finish");
}
