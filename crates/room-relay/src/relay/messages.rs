//! Messages exchanged with the relay actor.

use super::registry::RegisteredParticipant;
use crate::errors::RelayError;
use crate::settings::MediaPreferences;
use common::secret::SecretString;
use common::types::{AttemptId, ParticipantAddress, RoomId, SurfaceId};
use tokio::sync::oneshot;

/// Commands sent from a [`RelayHandle`](super::RelayHandle) to the actor.
#[derive(Debug)]
pub enum RelayCommand {
    /// Start a join. Responds with the attempt id issued for it.
    JoinRoom {
        host: String,
        token: SecretString,
        display_name: String,
        audio: bool,
        video: bool,
        respond_to: oneshot::Sender<Result<AttemptId, RelayError>>,
    },

    SetMuteStatus {
        muted: bool,
        respond_to: oneshot::Sender<Option<bool>>,
    },

    SetSpeaker {
        on: bool,
        respond_to: oneshot::Sender<Option<bool>>,
    },

    SetVideoEnabled {
        enabled: bool,
        respond_to: oneshot::Sender<Option<bool>>,
    },

    SwitchCamera,

    SetLocalVideoSurface {
        respond_to: oneshot::Sender<Option<SurfaceId>>,
    },

    /// Replace the media options used by later joins.
    SetMediaPreferences { preferences: MediaPreferences },

    /// Leave the active room (fire-and-forget).
    LeaveRoom,

    GetState {
        respond_to: oneshot::Sender<RelayState>,
    },
}

/// Events published to the relay's observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayNotification {
    /// A room became active. `participants` are the ones already present.
    RoomJoined {
        room_id: RoomId,
        name: Option<String>,
        participants: Vec<RegisteredParticipant>,
    },

    /// A join attempt failed, synchronously or after the SDK accepted it.
    JoinFailed { attempt: AttemptId, reason: String },

    /// The active room was left from the remote side.
    RoomLeft { room_id: RoomId },

    ParticipantJoined { participant: RegisteredParticipant },

    ParticipantLeft { participant: RegisteredParticipant },

    LocalStreamUpdated { room_id: RoomId },

    /// A remote stream changed. `surface` is set when the sender is registered.
    RemoteStreamUpdated {
        address: ParticipantAddress,
        surface: Option<SurfaceId>,
    },

    MessageReceived {
        from: ParticipantAddress,
        text: String,
    },
}

/// Snapshot of relay state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayState {
    pub room_id: Option<RoomId>,
    pub room_name: Option<String>,
    /// Join attempt still waiting for the SDK to complete.
    pub pending_attempt: Option<AttemptId>,
    pub participants: Vec<RegisteredParticipant>,
}
