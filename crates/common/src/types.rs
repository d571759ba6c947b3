//! Common data types for Room Relay components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a conferencing room, as reported by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// Wrap an SDK-provided room identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Stable address of a remote participant within a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantAddress(String);

impl ParticipantAddress {
    /// Wrap an SDK-provided participant address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Borrow the raw address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Generation number of a join attempt.
///
/// Every `join_room` issues a new, strictly larger attempt id. Completions
/// carrying an older id belong to a superseded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub u64);

impl AttemptId {
    /// The attempt that follows this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a rendering surface bound to a participant's video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_id_next_is_strictly_larger() {
        let first = AttemptId(7);
        assert!(first.next() > first);
        assert_eq!(first.next(), AttemptId(8));
    }

    #[test]
    fn test_attempt_id_next_saturates() {
        assert_eq!(AttemptId(u64::MAX).next(), AttemptId(u64::MAX));
    }

    #[test]
    fn test_room_id_equality_is_by_value() {
        assert_eq!(RoomId::from("room-a"), RoomId::new("room-a".to_string()));
        assert_ne!(RoomId::from("room-a"), RoomId::from("room-b"));
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(ParticipantAddress::from("sip:alice").to_string(), "sip:alice");
        assert_eq!(SurfaceId(3).to_string(), "surface-3");
    }

    #[test]
    fn test_room_id_serializes_transparently_as_newtype() {
        let json = serde_json::to_string(&RoomId::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
