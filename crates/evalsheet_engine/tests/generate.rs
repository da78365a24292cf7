use std::time::Duration;

use evalsheet_engine::{
    FailureKind, GeminiGenerator, GenerationRequest, GenerationSettings, Generator, Tone,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn request() -> GenerationRequest {
    GenerationRequest {
        name: "홍길동".to_string(),
        category: "진로활동".to_string(),
        keywords: "자율주행 자동차 탐구".to_string(),
        tone: Tone::Descriptive,
        target_length: 500,
        custom_instruction: String::new(),
        reference_example: None,
    }
}

fn generator(server: &MockServer) -> GeminiGenerator {
    let settings = GenerationSettings {
        base_url: server.uri(),
        ..GenerationSettings::default()
    };
    let generator = GeminiGenerator::new(settings).expect("client");
    generator.set_api_key("test-key");
    generator
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    }))
}

#[tokio::test]
async fn generate_returns_trimmed_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "topK": 40 }
        })))
        .respond_with(text_response("\n 자율주행 원리를 탐구함. \n"))
        .expect(1)
        .mount(&server)
        .await;

    let text = generator(&server).generate(&request()).await.expect("generate ok");
    assert_eq!(text, "자율주행 원리를 탐구함.");
}

#[tokio::test]
async fn generate_without_key_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_response("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let settings = GenerationSettings {
        base_url: server.uri(),
        ..GenerationSettings::default()
    };
    let generator = GeminiGenerator::new(settings).unwrap();
    assert!(!generator.has_api_key());

    let err = generator.generate(&request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MissingCredential);
    assert!(err.kind.is_credential());
}

#[tokio::test]
async fn rejected_key_is_a_credential_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let err = generator(&server).generate(&request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidCredential);
    assert!(err.message.contains("API key not valid"));
}

#[tokio::test]
async fn server_error_is_generic_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = generator(&server).generate(&request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(!err.kind.is_credential());
    assert_eq!(err.message, "overloaded");
}

#[tokio::test]
async fn blank_completion_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = generator(&server).generate(&request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::EmptyResponse);
}

#[tokio::test]
async fn slow_response_times_out_when_limit_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(text_response("late").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let settings = GenerationSettings {
        base_url: server.uri(),
        request_timeout: Some(Duration::from_millis(50)),
        ..GenerationSettings::default()
    };
    let generator = GeminiGenerator::new(settings).unwrap();
    generator.set_api_key("test-key");

    let err = generator.generate(&request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn test_connection_uses_given_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "good"))
        .respond_with(text_response("ok"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "bad"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let generator = generator(&server);
    generator.test_connection("good").await.expect("accepted");
    let err = generator.test_connection("bad").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidCredential);
    let err = generator.test_connection("  ").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MissingCredential);
}
