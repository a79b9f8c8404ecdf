use mockito::{Matcher, Server};
use ollama_vision::{GenerateOptions, OllamaClient, OllamaVisionConfig, VisionBackend, VisionError};
use serde_json::json;
use std::time::Duration;

fn client_for(server: &Server) -> OllamaClient {
    OllamaClient::new(OllamaVisionConfig::default().endpoint(server.url()))
}

// --- Request shape ---

#[tokio::test]
async fn test_request_carries_model_prompt_and_base64_image() {
    let mut server = Server::new_async().await;
    // "abc" base64-encodes to "YWJj"
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::Json(json!({
            "model": "llava:7b",
            "prompt": "Describe this image clearly.",
            "images": ["YWJj"],
            "stream": false,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": "A cat on a sofa", "done": true}"#)
        .create_async()
        .await;

    let answer = client_for(&server)
        .invoke("llava:7b", "Describe this image clearly.", b"abc")
        .await
        .unwrap();

    assert_eq!(answer, "A cat on a sofa");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generation_options_are_sent_when_configured() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({
            "options": {"num_predict": 512, "repeat_last_n": 128},
        })))
        .with_status(200)
        .with_body(r#"{"response": "ok"}"#)
        .create_async()
        .await;

    let config = OllamaVisionConfig::default()
        .endpoint(server.url())
        .timeout(Duration::from_secs(5))
        .options(GenerateOptions::default());
    let answer = OllamaClient::new(config)
        .invoke("llava:7b", "hi", b"img")
        .await
        .unwrap();

    assert_eq!(answer, "ok");
    mock.assert_async().await;
}

// --- Response handling ---

#[tokio::test]
async fn test_response_is_trimmed_and_think_blocks_removed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(r#"{"response": "<think>looking</think>\n  cat, sofa, pet \n"}"#)
        .create_async()
        .await;

    let answer = client_for(&server)
        .invoke("llava:7b", "tags", b"img")
        .await
        .unwrap();
    assert_eq!(answer, "cat, sofa, pet");
}

#[tokio::test]
async fn test_empty_response_text_is_success() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(r#"{"response": ""}"#)
        .create_async()
        .await;

    let answer = client_for(&server).invoke("llava:7b", "p", b"img").await;
    assert_eq!(answer, Ok(String::new()));
}

// --- Failures ---

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(404)
        .with_body(r#"{"error": "model 'bakllava:7b' not found"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .invoke("bakllava:7b", "p", b"img")
        .await
        .unwrap_err();

    match err {
        VisionError::Http(status, body) => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body("this is not json")
        .create_async()
        .await;

    let err = client_for(&server)
        .invoke("llava:7b", "p", b"img")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_response");
}

#[tokio::test]
async fn test_missing_response_field_is_invalid_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(r#"{"done": true}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .invoke("llava:7b", "p", b"img")
        .await
        .unwrap_err();
    assert!(matches!(err, VisionError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_error() {
    // Port 9 (discard) is essentially never listening on test machines.
    let config = OllamaVisionConfig::default()
        .endpoint("http://127.0.0.1:9")
        .timeout(Duration::from_secs(2));

    let err = OllamaClient::new(config)
        .invoke("llava:7b", "p", b"img")
        .await
        .unwrap_err();
    assert!(matches!(err, VisionError::Connection(..)));
}
