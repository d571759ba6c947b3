//! Room token client for the application server.
//!
//! The application server hands out the credentials the SDK needs to join a
//! room: a token and the conferencing domain. Rooms can be looked up
//! (`GET /api/room?name=`) or created (`POST /api/room`). Creation may require
//! Basic auth; `GET /api/config` tells the client whether it does.
//!
//! Requests are never retried. Every request gets a transaction id that is
//! attached to its tracing span.

use common::secret::{ExposeSecret, SecretString};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

/// Connection timeout for the HTTP client.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum length for error body in error messages.
const MAX_ERROR_BODY_LEN: usize = 256;

/// `AUTH_TYPE` value that makes room creation send Basic auth.
pub const BASIC_AUTH: &str = "BASIC_AUTH";

const DEFAULT_CONFLICT_MESSAGE: &str = "Unexpected 409 response from POST request";

/// Token client errors.
#[derive(Debug, Error)]
pub enum TokenClientError {
    /// No response (connection, timeout, TLS).
    #[error("No response from application server: {0}")]
    Network(String),

    /// 404, or an empty room name on lookup.
    #[error("Room not found")]
    NotFound,

    /// 409 on creation. Carries the server's message.
    #[error("{0}")]
    Conflict(String),

    #[error("Unexpected response from application server ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response from application server: {0}")]
    Parse(String),

    #[error("Room name is empty")]
    EmptyRoomName,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// What the SDK needs to join a room.
#[derive(Debug, Clone)]
pub struct RoomCredentials {
    pub domain: String,
    pub token: SecretString,
}

/// Application server configuration from `/api/config`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    #[serde(rename = "VCS_HOST")]
    pub vcs_host: String,
    #[serde(rename = "AUTH_TYPE")]
    pub auth_type: String,
}

impl ServerConfig {
    #[must_use]
    pub fn requires_basic_auth(&self) -> bool {
        self.auth_type == BASIC_AUTH
    }
}

#[derive(Deserialize)]
struct RoomResponse {
    room: RoomToken,
    domain: String,
}

#[derive(Deserialize)]
struct RoomToken {
    token: SecretString,
}

/// Client for the application server's room API.
pub struct RoomTokenClient {
    base_url: String,
    http_client: Client,
    username: String,
    password: SecretString,
    authorization_required: AtomicBool,
}

impl std::fmt::Debug for RoomTokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomTokenClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field(
                "authorization_required",
                &self.authorization_required.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

impl RoomTokenClient {
    /// Create a client for `base_url`. A bare host is treated as `https://`.
    ///
    /// # Errors
    ///
    /// `TokenClientError::Configuration` if the base URL is empty or the HTTP
    /// client cannot be built.
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: SecretString,
        timeout: Duration,
    ) -> Result<Self, TokenClientError> {
        let base_url = normalize_base_url(base_url)?;

        let http_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                TokenClientError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url,
            http_client,
            username: username.into(),
            password,
            authorization_required: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether room creation currently sends Basic auth.
    #[must_use]
    pub fn authorization_required(&self) -> bool {
        self.authorization_required.load(Ordering::Relaxed)
    }

    /// Look up an existing room.
    ///
    /// An empty name is `NotFound` without touching the network.
    #[instrument(skip_all, name = "relay.token_client.get_token", fields(room = %room_name, transaction_id = %Uuid::new_v4()))]
    pub async fn get_token(&self, room_name: &str) -> Result<RoomCredentials, TokenClientError> {
        if room_name.is_empty() {
            debug!(target: "relay.token_client", "Room name is empty");
            return Err(TokenClientError::NotFound);
        }

        let url = format!("{}/api/room", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("name", room_name)])
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "*/*")
            .send()
            .await
            .map_err(|e| network_error(&url, &e))?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                debug!(target: "relay.token_client", url = %url, "Room found");
                parse_credentials(response).await
            }
            StatusCode::NOT_FOUND => {
                debug!(target: "relay.token_client", url = %url, "Room not found");
                Err(TokenClientError::NotFound)
            }
            _ => Err(server_error(status, response).await),
        }
    }

    /// Create a room, or get `Conflict` if it exists.
    #[instrument(skip_all, name = "relay.token_client.create_token", fields(room = %room_name, transaction_id = %Uuid::new_v4()))]
    pub async fn create_token(
        &self,
        room_name: &str,
    ) -> Result<RoomCredentials, TokenClientError> {
        if room_name.is_empty() {
            debug!(target: "relay.token_client", "Room name is empty");
            return Err(TokenClientError::EmptyRoomName);
        }

        let url = format!("{}/api/room", self.base_url);
        let mut request = self
            .http_client
            .post(&url)
            .header(header::ACCEPT, "*/*")
            .json(&serde_json::json!({ "name": room_name }));

        if self.authorization_required() {
            debug!(target: "relay.token_client", "Including authorization header");
            request = request.basic_auth(&self.username, Some(self.password.expose_secret()));
        }

        let response = request
            .send()
            .await
            .map_err(|e| network_error(&url, &e))?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                debug!(target: "relay.token_client", url = %url, "Room created");
                parse_credentials(response).await
            }
            StatusCode::CONFLICT => {
                let body = read_body(response).await;
                let message = conflict_message(&body);
                debug!(target: "relay.token_client", url = %url, message = %message, "Room creation conflict");
                Err(TokenClientError::Conflict(message))
            }
            _ => Err(server_error(status, response).await),
        }
    }

    /// Fetch the server configuration and remember whether creation needs
    /// Basic auth.
    #[instrument(skip_all, name = "relay.token_client.get_config", fields(transaction_id = %Uuid::new_v4()))]
    pub async fn get_config(&self) -> Result<ServerConfig, TokenClientError> {
        let url = format!("{}/api/config", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "*/*")
            .send()
            .await
            .map_err(|e| network_error(&url, &e))?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let config: ServerConfig = response.json().await.map_err(|e| {
                    warn!(target: "relay.token_client", error = %e, "Failed to parse config response");
                    TokenClientError::Parse(e.to_string())
                })?;

                self.authorization_required
                    .store(config.requires_basic_auth(), Ordering::Relaxed);
                debug!(
                    target: "relay.token_client",
                    vcs_host = %config.vcs_host,
                    auth_type = %config.auth_type,
                    "Server config retrieved"
                );
                Ok(config)
            }
            StatusCode::NOT_FOUND => Err(TokenClientError::NotFound),
            _ => Err(server_error(status, response).await),
        }
    }
}

/// Trim trailing slashes and default the scheme to https.
fn normalize_base_url(raw: &str) -> Result<String, TokenClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(TokenClientError::Configuration(
            "application server address is empty".to_string(),
        ));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{trimmed}"))
    }
}

fn network_error(url: &str, e: &reqwest::Error) -> TokenClientError {
    debug!(target: "relay.token_client", url = %url, error = %e, "No response from request");
    TokenClientError::Network(e.to_string())
}

async fn parse_credentials(
    response: reqwest::Response,
) -> Result<RoomCredentials, TokenClientError> {
    let room: RoomResponse = response.json().await.map_err(|e| {
        warn!(target: "relay.token_client", error = %e, "Token not found in response");
        TokenClientError::Parse(e.to_string())
    })?;

    Ok(RoomCredentials {
        domain: room.domain,
        token: room.room.token,
    })
}

async fn read_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_else(|e| {
        trace!(target: "relay.token_client", error = %e, "Failed to read response body");
        String::new()
    })
}

async fn server_error(status: StatusCode, response: reqwest::Response) -> TokenClientError {
    let body = read_body(response).await;
    warn!(target: "relay.token_client", status = %status, "Unexpected response from application server");
    trace!(target: "relay.token_client", body = %body, "Unexpected response body");

    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        truncate_body(&body)
    };

    TokenClientError::Server {
        status: status.as_u16(),
        message,
    }
}

/// Message to surface for a 409.
///
/// The body may be a JSON string, a JSON object with a `message` or `error`
/// field, or plain text.
fn conflict_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return DEFAULT_CONFLICT_MESSAGE.to_string();
    }

    let message = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(text)) => text,
        Ok(serde_json::Value::Object(map)) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| trimmed.to_string(), str::to_string),
        _ => trimmed.to_string(),
    };

    if message.is_empty() {
        DEFAULT_CONFLICT_MESSAGE.to_string()
    } else {
        truncate_body(&message)
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LEN {
        let head: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{head}...[truncated]")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("sdk-snapshot.example.com").unwrap(),
            "https://sdk-snapshot.example.com"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080/").unwrap(),
            "http://localhost:8080"
        );
        assert!(matches!(
            normalize_base_url("  "),
            Err(TokenClientError::Configuration(_))
        ));
    }

    #[test]
    fn test_conflict_message_variants() {
        assert_eq!(conflict_message("\"room exists\""), "room exists");
        assert_eq!(conflict_message("room exists"), "room exists");
        assert_eq!(
            conflict_message(r#"{"message":"Room alpha already exists"}"#),
            "Room alpha already exists"
        );
        assert_eq!(conflict_message(r#"{"error":"taken"}"#), "taken");
        assert_eq!(conflict_message(r#"{"code":7}"#), r#"{"code":7}"#);
        assert_eq!(conflict_message(""), DEFAULT_CONFLICT_MESSAGE);
        assert_eq!(conflict_message("\"\""), DEFAULT_CONFLICT_MESSAGE);
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LEN + 10);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("...[truncated]"));
        assert_eq!(truncated.len(), MAX_ERROR_BODY_LEN + "...[truncated]".len());

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn test_server_config_basic_auth() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"VCS_HOST":"vcs.example.com","AUTH_TYPE":"BASIC_AUTH"}"#)
                .unwrap();
        assert!(config.requires_basic_auth());

        let config: ServerConfig =
            serde_json::from_str(r#"{"VCS_HOST":"vcs.example.com","AUTH_TYPE":"NONE"}"#).unwrap();
        assert!(!config.requires_basic_auth());
    }

    #[test]
    fn test_debug_redacts_password() {
        let client = RoomTokenClient::new(
            "https://app.example.com",
            "demo",
            SecretString::from("hunter2"),
            Duration::from_secs(5),
        )
        .unwrap();

        let debug_str = format!("{client:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TokenClientError::EmptyRoomName.to_string(),
            "Room name is empty"
        );
        assert_eq!(
            TokenClientError::Conflict("room exists".to_string()).to_string(),
            "room exists"
        );
    }
}
