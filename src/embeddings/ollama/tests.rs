use super::*;

#[test]
fn client_configuration() {
    let config = EmbeddingConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        model: "test-model".to_string(),
        batch_size: 128,
        ..EmbeddingConfig::default()
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model(), "test-model");
    assert_eq!(client.batch_size, 128);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn client_builder_methods() {
    let client = OllamaClient::new(&EmbeddingConfig::default())
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5)
        .with_retry_delay(Duration::from_millis(10));

    assert_eq!(client.retry_attempts, 5);
    assert_eq!(client.retry_delay, Duration::from_millis(10));
}

#[test]
fn retry_attempts_never_zero() {
    let client = OllamaClient::new(&EmbeddingConfig::default())
        .expect("Failed to create client")
        .with_retry_attempts(0);

    assert_eq!(client.retry_attempts, 1);
}

#[test]
fn invalid_config_is_rejected() {
    let config = EmbeddingConfig {
        host: "bad host name".to_string(),
        ..EmbeddingConfig::default()
    };

    assert!(OllamaClient::new(&config).is_err());
}

#[test]
fn embed_request_shape() {
    let inputs = vec!["first".to_string(), "second".to_string()];
    let request = EmbedRequest {
        model: "all-minilm",
        input: &inputs,
    };

    let json: serde_json::Value =
        serde_json::to_value(&request).expect("request should serialize");
    assert_eq!(json["model"], "all-minilm");
    assert_eq!(json["input"][1], "second");
}

#[test]
fn unreachable_server_fails_without_retrying_forever() {
    let config = EmbeddingConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..EmbeddingConfig::default()
    };
    let client = OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_retry_attempts(2)
        .with_retry_delay(Duration::from_millis(1));

    assert!(client.embed("hello").is_err());
}

#[test]
fn empty_batch_makes_no_request() {
    let config = EmbeddingConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..EmbeddingConfig::default()
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    let embeddings = client
        .embed_batch(&[])
        .expect("empty batch should not touch the network");
    assert!(embeddings.is_empty());
}
