//! Integration tests for `ChatClient` using wiremock HTTP mocks.

use topicdigest_llm::{
    ChatClient, ChatClientConfig, GenerationRequest, LlmError, ModelParams, RetryPolicy,
    TextGenerator,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str, api_key: Option<&str>, max_retries: u32) -> ChatClient {
    ChatClient::new(ChatClientConfig {
        api_base: base_url.to_string(),
        api_key: api_key.map(str::to_string),
        timeout_secs: 5,
        retry: RetryPolicy {
            max_retries,
            backoff_base_ms: 0,
            max_delay_ms: 0,
        },
    })
    .expect("client construction should not fail")
}

fn request() -> GenerationRequest {
    GenerationRequest {
        system: "You are a news editor.".to_string(),
        user: "Title: Senate passes budget".to_string(),
        params: ModelParams {
            model: "gpt-test".to_string(),
            temperature: 0.2,
            max_tokens: Some(512),
        },
    }
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
}

#[tokio::test]
async fn generate_returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-test",
            "max_tokens": 512,
            "messages": [
                { "role": "system", "content": "You are a news editor." },
                { "role": "user", "content": "Title: Senate passes budget" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("The Senate passed it.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/v1/", server.uri()), Some("sk-test"), 0);
    let text = client.generate(&request()).await.expect("should generate");

    assert_eq!(text, "The Senate passed it.");
}

#[tokio::test]
async fn server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("recovered")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None, 3);
    let text = client.generate(&request()).await.expect("should recover");

    assert_eq!(text, "recovered");
}

#[tokio::test]
async fn rate_limit_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None, 2);
    let err = client.generate(&request()).await.unwrap_err();

    assert!(matches!(err, LlmError::RateLimited));
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown model"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None, 3);
    let err = client.generate(&request()).await.unwrap_err();

    assert!(matches!(
        err,
        LlmError::UnexpectedStatus { status: 400, ref body } if body == "unknown model"
    ));
}

#[tokio::test]
async fn empty_choices_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None, 0);
    let err = client.generate(&request()).await.unwrap_err();

    assert!(matches!(err, LlmError::EmptyResponse));
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None, 3);
    let err = client.generate(&request()).await.unwrap_err();

    assert!(matches!(err, LlmError::Deserialize { .. }));
}
