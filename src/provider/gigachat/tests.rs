//! Tests for the GigaChat chat client.

#![cfg(test)]

use super::client::{ChatClient, ChatParams};
use crate::auth::{IssuedToken, TokenHandle};
use crate::provider::Error;
use crate::provider::http::{ClientOptions, HttpClient};
use mockito::Matcher;

const PATH: &str = "/api/v1/chat/completions";

fn client(url: String, tokens: TokenHandle) -> ChatClient {
    let http = HttpClient::new(&ClientOptions::default()).unwrap();
    ChatClient::new(http, url, ChatParams::default(), tokens)
}

fn with_token(token: &str) -> TokenHandle {
    TokenHandle::with_token(IssuedToken::new(token))
}

#[test]
fn test_build_request_defaults() {
    let client = client("http://unused".into(), TokenHandle::new());
    let request = client.build_request("hi");

    assert_eq!(request.model, "GigaChat");
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].role, "user");
    assert_eq!(request.messages[0].content, "hi");
    assert_eq!(request.n, 1);
    assert!(!request.stream);
    assert_eq!(request.max_tokens, 512);
    assert!((request.repetition_penalty - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_build_request_custom_params() {
    let http = HttpClient::new(&ClientOptions::default()).unwrap();
    let params = ChatParams {
        model: "GigaChat-Pro".into(),
        max_tokens: 1024,
        repetition_penalty: 1.1,
    };
    let client = ChatClient::new(http, "http://unused", params, TokenHandle::new());
    let request = client.build_request("hi");

    assert_eq!(request.model, "GigaChat-Pro");
    assert_eq!(request.max_tokens, 1024);
}

#[tokio::test]
async fn test_send_request_uses_cached_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("authorization", "Bearer T")
        .match_header("accept", "application/json")
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), with_token("T"));
    client.send_request("hi").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_request_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::Json(serde_json::json!({
            "model": "GigaChat",
            "messages": [{"role": "user", "content": "hi"}],
            "n": 1,
            "stream": false,
            "max_tokens": 512,
            "repetition_penalty": 1.0,
            "update_interval": 0
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), with_token("T"));
    client.send_request("hi").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_request_returns_first_choice() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), with_token("T"));
    assert_eq!(client.send_request("hi").await.unwrap(), "hello");
}

#[tokio::test]
async fn test_send_request_empty_choices() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), with_token("T"));
    let err = client.send_request("hi").await.unwrap_err();
    assert!(matches!(err, Error::EmptyCompletion));
}

#[tokio::test]
async fn test_send_request_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(403)
        .with_body("forbidden")
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), with_token("T"));
    let err = client.send_request("hi").await.unwrap_err();

    assert!(matches!(err, Error::Api { status: 403, .. }));
    let msg = err.to_string();
    assert!(msg.contains("403"));
    assert!(msg.contains("forbidden"));
}

#[tokio::test]
async fn test_send_request_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(401)
        .with_body(r#"{"status":401,"message":"Unauthorized"}"#)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), with_token("stale"));
    let err = client.send_request("hi").await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_send_request_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"choices": "nope"}"#)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), with_token("T"));
    let err = client.send_request("hi").await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn test_send_request_without_token_skips_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let client = client(format!("{}{PATH}", server.url()), TokenHandle::new());
    let err = client.send_request("hi").await.unwrap_err();

    assert!(matches!(err, Error::TokenUnavailable));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_request_sees_token_updates() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("authorization", "Bearer NEW")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
        .create_async()
        .await;

    let tokens = with_token("OLD");
    let client = client(format!("{}{PATH}", server.url()), tokens.clone());
    tokens.store(IssuedToken::new("NEW")).await;

    client.send_request("hi").await.unwrap();
    mock.assert_async().await;
}
