//! Boundary to the realtime conferencing SDK.
//!
//! The SDK is an external collaborator. The relay talks to it through two
//! traits: [`RealtimeSdk`] starts joins, and [`RoomSession`] is the handle to a
//! joined room. SDK callbacks never touch relay state directly; an adapter
//! pushes them into the relay as [`SdkEvent`]s through an [`SdkEventSink`],
//! which is cheap to clone and safe to call from any thread.

use crate::errors::SdkError;
use crate::settings::{ConferenceTopology, VideoCodec};
use common::secret::SecretString;
use common::types::{AttemptId, ParticipantAddress, RoomId, SurfaceId};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Entry point into the SDK.
pub trait RealtimeSdk: Send + Sync {
    /// Register the sink that receives every SDK callback.
    fn attach(&self, sink: SdkEventSink);

    /// Start joining a room. Completion arrives later as
    /// [`SdkEvent::RoomInitialized`], [`SdkEvent::RoomInitError`] or
    /// [`SdkEvent::JoinFailed`] carrying the request's attempt id.
    ///
    /// # Errors
    ///
    /// Returns an error when the SDK refuses the request outright.
    fn join_room(&self, request: JoinRequest) -> Result<(), SdkError>;
}

/// Handle to a joined room, owned by the SDK.
pub trait RoomSession: Send + Sync + fmt::Debug {
    fn room_id(&self) -> RoomId;

    fn name(&self) -> Option<String>;

    /// Participants already in the room when it was initialized.
    fn remote_participants(&self) -> Vec<RemoteParticipant>;

    fn is_muted(&self) -> bool;

    fn toggle_mute(&self);

    fn is_speaker_on(&self) -> bool;

    fn toggle_speaker(&self);

    fn has_video(&self) -> bool;

    fn has_hd_video(&self) -> bool;

    /// Flip local video, keeping the given HD setting.
    fn toggle_video(&self, hd_video: bool);

    fn switch_camera(&self);

    /// Render a remote participant's video on `surface`.
    fn set_remote_video_surface(&self, address: &ParticipantAddress, surface: SurfaceId);

    /// Render the local preview on `surface`.
    fn set_local_video_surface(&self, surface: SurfaceId);

    fn leave(&self);
}

/// A remote participant as reported by the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParticipant {
    pub address: ParticipantAddress,
    pub name: Option<String>,
    pub has_video: bool,
}

impl RemoteParticipant {
    #[must_use]
    pub fn new(address: impl Into<ParticipantAddress>, name: Option<&str>) -> Self {
        Self {
            address: address.into(),
            name: name.map(str::to_string),
            has_video: false,
        }
    }

    /// Name to show for this participant, falling back to the address.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.address.to_string())
    }
}

/// Everything the SDK needs to join a room.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub attempt: AttemptId,
    pub host: String,
    pub token: SecretString,
    pub display_name: String,
    pub audio: bool,
    pub video: bool,
    pub hd_video: bool,
    pub codec: VideoCodec,
    pub topology: ConferenceTopology,
    pub scale_down_video: bool,
    pub monitor_qos: bool,
}

/// A callback from the SDK, re-dispatched onto the relay task.
#[derive(Debug, Clone)]
pub enum SdkEvent {
    RoomInitialized {
        attempt: AttemptId,
        session: Arc<dyn RoomSession>,
    },
    RoomInitError {
        attempt: AttemptId,
        reason: String,
    },
    JoinFailed {
        attempt: AttemptId,
        reason: String,
    },
    RoomLeft {
        room_id: RoomId,
    },
    ParticipantJoined {
        room_id: RoomId,
        participant: RemoteParticipant,
    },
    ParticipantLeft {
        room_id: RoomId,
        participant: RemoteParticipant,
    },
    LocalStreamUpdated {
        room_id: RoomId,
    },
    RemoteStreamUpdated {
        room_id: RoomId,
        address: ParticipantAddress,
    },
    MessageReceived {
        room_id: RoomId,
        from: ParticipantAddress,
        text: String,
    },
    Log {
        message: String,
    },
}

impl SdkEvent {
    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SdkEvent::RoomInitialized { .. } => "room_initialized",
            SdkEvent::RoomInitError { .. } => "room_init_error",
            SdkEvent::JoinFailed { .. } => "join_failed",
            SdkEvent::RoomLeft { .. } => "room_left",
            SdkEvent::ParticipantJoined { .. } => "participant_joined",
            SdkEvent::ParticipantLeft { .. } => "participant_left",
            SdkEvent::LocalStreamUpdated { .. } => "local_stream_updated",
            SdkEvent::RemoteStreamUpdated { .. } => "remote_stream_updated",
            SdkEvent::MessageReceived { .. } => "message_received",
            SdkEvent::Log { .. } => "log",
        }
    }
}

/// Sending side of the relay's SDK event channel.
#[derive(Debug, Clone)]
pub struct SdkEventSink {
    sender: mpsc::UnboundedSender<SdkEvent>,
}

impl SdkEventSink {
    /// Create a sink and the receiver the relay drains.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SdkEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Deliver an event. Returns `false` once the relay has stopped.
    pub fn emit(&self, event: SdkEvent) -> bool {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(()) => true,
            Err(_) => {
                warn!(target: "relay.sdk", event = kind, "Relay stopped, SDK event dropped");
                false
            }
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
