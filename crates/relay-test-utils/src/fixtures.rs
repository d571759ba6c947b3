//! Test fixtures: participants, application-server responses and helpers for
//! reading relay notifications.

use common::secret::SecretString;
use room_relay::relay::RelayNotification;
use room_relay::sdk::RemoteParticipant;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// How long helpers wait for a notification before failing the test.
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Room token used across tests.
pub const TEST_TOKEN: &str = "tok123";

/// Conferencing domain used across tests.
pub const TEST_DOMAIN: &str = "d.example.com";

/// Participant with a display name derived from the address.
#[must_use]
pub fn participant(address: &str) -> RemoteParticipant {
    RemoteParticipant::new(address, Some(&format!("Participant {address}")))
}

/// Participant whose video is already flowing.
#[must_use]
pub fn video_participant(address: &str) -> RemoteParticipant {
    RemoteParticipant {
        has_video: true,
        ..participant(address)
    }
}

#[must_use]
pub fn token() -> SecretString {
    SecretString::from(TEST_TOKEN)
}

/// `/api/room` success body.
#[must_use]
pub fn room_response(domain: &str, token: &str) -> Value {
    json!({
        "room": { "token": token },
        "domain": domain,
    })
}

/// `/api/config` success body.
#[must_use]
pub fn config_response(vcs_host: &str, auth_type: &str) -> Value {
    json!({
        "VCS_HOST": vcs_host,
        "AUTH_TYPE": auth_type,
    })
}

/// Serve `GET /api/room?name=<room>` with the test credentials.
pub async fn mount_existing_room(server: &MockServer, room: &str) {
    Mock::given(method("GET"))
        .and(path("/api/room"))
        .and(query_param("name", room))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(room_response(TEST_DOMAIN, TEST_TOKEN)),
        )
        .mount(server)
        .await;
}

/// Serve `GET /api/config` with the given auth type.
pub async fn mount_server_config(server: &MockServer, auth_type: &str) {
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(config_response("vcs.example.com", auth_type)),
        )
        .mount(server)
        .await;
}

/// Wait for the next notification.
///
/// # Panics
///
/// Panics if nothing arrives within [`NOTIFICATION_TIMEOUT`] or the relay
/// has stopped.
pub async fn next_notification(
    rx: &mut mpsc::UnboundedReceiver<RelayNotification>,
) -> RelayNotification {
    tokio::time::timeout(NOTIFICATION_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for relay notification")
        .expect("relay notification channel closed")
}

/// Assert that no notification is queued.
///
/// # Panics
///
/// Panics if a notification is waiting.
pub fn assert_no_notification(rx: &mut mpsc::UnboundedReceiver<RelayNotification>) {
    if let Ok(notification) = rx.try_recv() {
        panic!("unexpected relay notification: {notification:?}");
    }
}
