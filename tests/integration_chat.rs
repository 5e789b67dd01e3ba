#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Chat completion client tests against a mock HTTP server

use serde_json::json;
use sheet_insights::completion::{ChatClient, ChatCompleter, CompletionRequest};
use sheet_insights::config::CompletionConfig;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ChatClient {
    let config = CompletionConfig {
        base_url: format!("{}/openai/v1", server.uri()),
        model: "test-model".to_string(),
        timeout_seconds: 5,
        ..CompletionConfig::default()
    };
    ChatClient::new(&config, "test-key".to_string()).expect("client should build")
}

fn request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        prompt: prompt.to_string(),
        temperature: 0.0,
        max_tokens: 1024,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "messages": [{ "role": "user", "content": "Which region sold the most?" }],
            "max_tokens": 1024,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "North sold the most." },
                "finish_reason": "stop",
            }],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let answer =
        tokio::task::spawn_blocking(move || client.complete(&request("Which region sold the most?")))
            .await
            .expect("blocking task should finish")
            .expect("completion should succeed");

    assert_eq!(answer, "North sold the most.");
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_carries_api_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid API Key", "type": "invalid_request_error" },
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = tokio::task::spawn_blocking(move || client.complete(&request("hello")))
        .await
        .expect("blocking task should finish");

    let message = format!("{:#}", result.expect_err("401 should fail"));
    assert!(message.contains("401"));
    assert!(message.contains("Invalid API Key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn response_without_choices_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = tokio::task::spawn_blocking(move || client.complete(&request("hello")))
        .await
        .expect("blocking task should finish");

    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_response_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = tokio::task::spawn_blocking(move || client.complete(&request("hello")))
        .await
        .expect("blocking task should finish");

    assert!(result.is_err());
}
