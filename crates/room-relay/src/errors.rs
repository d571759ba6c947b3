//! Session relay error types.
//!
//! Relay errors are returned from [`RelayHandle`](crate::relay::RelayHandle)
//! calls. Join failures reported asynchronously by the SDK are not errors of the
//! call that started the join; they are published as
//! [`RelayNotification::JoinFailed`](crate::relay::RelayNotification::JoinFailed).

use thiserror::Error;

/// Errors surfaced by the conferencing SDK boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// The SDK refused to start a join.
    ///
    /// Failures after the join was accepted are not errors; they arrive as
    /// [`SdkEvent::RoomInitError`](crate::sdk::SdkEvent::RoomInitError).
    #[error("Join rejected by SDK: {0}")]
    JoinRejected(String),
}

/// Session relay error type.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The SDK rejected a join request synchronously.
    #[error("Join failed: {0}")]
    JoinRejected(#[from] SdkError),

    /// The relay actor is gone (shut down or panicked).
    #[error("Relay channel closed")]
    ChannelClosed,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns a message suitable for an alert shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RelayError::JoinRejected(SdkError::JoinRejected(reason)) => {
                format!("Unable to join the room: {reason}")
            }
            RelayError::ChannelClosed | RelayError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_error_converts_to_join_rejected() {
        let err: RelayError = SdkError::JoinRejected("invalid token".to_string()).into();
        assert!(matches!(err, RelayError::JoinRejected(_)));
        assert_eq!(
            err.to_string(),
            "Join failed: Join rejected by SDK: invalid token"
        );
    }

    #[test]
    fn test_user_messages_hide_internal_details() {
        let err = RelayError::Internal("oneshot dropped at relay/actor.rs".to_string());
        assert_eq!(err.user_message(), "An internal error occurred");
        assert!(!err.user_message().contains("oneshot"));

        assert_eq!(
            RelayError::ChannelClosed.user_message(),
            "An internal error occurred"
        );
    }

    #[test]
    fn test_user_message_carries_join_reason() {
        let err = RelayError::JoinRejected(SdkError::JoinRejected("room closed".to_string()));
        assert_eq!(err.user_message(), "Unable to join the room: room closed");
    }
}
