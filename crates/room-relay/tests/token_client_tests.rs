//! Room token client tests against a mock application server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use common::secret::{ExposeSecret, SecretString};
use relay_test_utils::{
    mount_existing_room, mount_server_config, room_response, TEST_DOMAIN, TEST_TOKEN,
};
use room_relay::token_client::{RoomTokenClient, TokenClientError};
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RoomTokenClient {
    RoomTokenClient::new(
        &server.uri(),
        "demo",
        SecretString::from("pw"),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_get_token_success() {
    let server = MockServer::start().await;
    mount_existing_room(&server, "alpha").await;

    let credentials = client_for(&server).get_token("alpha").await.unwrap();

    assert_eq!(credentials.domain, TEST_DOMAIN);
    assert_eq!(credentials.token.expose_secret(), TEST_TOKEN);
}

#[tokio::test]
async fn test_get_token_sends_json_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/room"))
        .and(query_param("name", "alpha"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "*/*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_response("d", "t")))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).get_token("alpha").await.unwrap();
}

#[tokio::test]
async fn test_get_token_empty_name_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client_for(&server).get_token("").await;
    assert!(matches!(result, Err(TokenClientError::NotFound)));
}

#[tokio::test]
async fn test_get_token_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/room"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client_for(&server).get_token("missing").await;
    assert!(matches!(result, Err(TokenClientError::NotFound)));
}

#[tokio::test]
async fn test_get_token_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/room"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    match client_for(&server).get_token("alpha").await {
        Err(TokenClientError::Server { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => unreachable!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn test_get_token_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/room"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"domain": "d"})))
        .mount(&server)
        .await;

    let result = client_for(&server).get_token("alpha").await;
    assert!(matches!(result, Err(TokenClientError::Parse(_))));
}

#[tokio::test]
async fn test_network_failure() {
    // Nothing listens on the discard port.
    let client = RoomTokenClient::new(
        "http://127.0.0.1:9",
        "demo",
        SecretString::from("pw"),
        Duration::from_secs(2),
    )
    .unwrap();

    let result = client.get_token("alpha").await;
    assert!(matches!(result, Err(TokenClientError::Network(_))));
}

#[tokio::test]
async fn test_create_token_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/room"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"name": "alpha"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(room_response("d.example.com", "tok123")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let credentials = client_for(&server).create_token("alpha").await.unwrap();

    assert_eq!(credentials.domain, "d.example.com");
    assert_eq!(credentials.token.expose_secret(), "tok123");
}

#[tokio::test]
async fn test_create_token_conflict_json_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/room"))
        .respond_with(ResponseTemplate::new(409).set_body_string("\"room exists\""))
        .mount(&server)
        .await;

    match client_for(&server).create_token("alpha").await {
        Err(TokenClientError::Conflict(message)) => assert_eq!(message, "room exists"),
        other => unreachable!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn test_create_token_conflict_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/room"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    match client_for(&server).create_token("alpha").await {
        Err(TokenClientError::Conflict(message)) => {
            assert_eq!(message, "Unexpected 409 response from POST request");
        }
        other => unreachable!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn test_create_token_empty_name_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client_for(&server).create_token("").await;
    assert!(matches!(result, Err(TokenClientError::EmptyRoomName)));
}

#[tokio::test]
async fn test_create_token_without_basic_auth_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/room"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/room"))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_response("d", "t")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.authorization_required());
    client.create_token("alpha").await.unwrap();
}

#[tokio::test]
async fn test_get_config_enables_basic_auth() {
    let server = MockServer::start().await;
    mount_server_config(&server, "BASIC_AUTH").await;
    // base64("demo:pw")
    Mock::given(method("POST"))
        .and(path("/api/room"))
        .and(header("authorization", "Basic ZGVtbzpwdw=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(room_response("d", "t")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let config = client.get_config().await.unwrap();
    assert_eq!(config.vcs_host, "vcs.example.com");
    assert!(config.requires_basic_auth());
    assert!(client.authorization_required());

    client.create_token("alpha").await.unwrap();
}

#[tokio::test]
async fn test_get_config_without_auth() {
    let server = MockServer::start().await;
    mount_server_config(&server, "NONE").await;

    let client = client_for(&server);
    let config = client.get_config().await.unwrap();

    assert_eq!(config.auth_type, "NONE");
    assert!(!client.authorization_required());
}

#[tokio::test]
async fn test_get_config_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client_for(&server).get_config().await;
    assert!(matches!(result, Err(TokenClientError::NotFound)));
}
