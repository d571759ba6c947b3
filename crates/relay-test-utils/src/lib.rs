//! # Relay Test Utilities
//!
//! Mocks and fixtures for testing the room relay without a real
//! conferencing SDK or application server.
//!
//! ## Modules
//!
//! - `mock_sdk` - Scriptable [`RealtimeSdk`](room_relay::sdk::RealtimeSdk) that records joins and emits events
//! - `mock_session` - [`RoomSession`](room_relay::sdk::RoomSession) that counts device toggles
//! - `fixtures` - Participants, application-server responses, notification helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let sdk = MockSdk::new();
//!     let (relay, mut notifications, _task) = RelayActor::spawn(
//!         sdk.as_sdk(),
//!         MediaPreferences::default(),
//!         CancellationToken::new(),
//!     );
//!
//!     let attempt = relay.join_room("host", token(), "Alice", true, true).await.unwrap();
//!     let session = MockRoomSession::new("roomA").with_participant(participant("p1"));
//!     sdk.complete_join(attempt, &session);
//!
//!     let joined = next_notification(&mut notifications).await;
//! }
//! ```

pub mod fixtures;
pub mod mock_sdk;
pub mod mock_session;

pub use fixtures::*;
pub use mock_sdk::*;
pub use mock_session::*;
