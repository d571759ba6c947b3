//! Session relay state machine.
//!
//! `SessionRelay` owns the active room, the participant registry and the
//! join-attempt counter. It applies SDK events and device commands and
//! returns the notification to publish, if any. It does no I/O of its own
//! beyond calls on the active [`RoomSession`]; the actor drives it.
//!
//! Every event that names a room is checked against the active room before it
//! mutates anything. Events for any other room are logged and dropped.

use super::messages::{RelayNotification, RelayState};
use super::registry::ParticipantRegistry;
use crate::sdk::{JoinRequest, RemoteParticipant, RoomSession};
use crate::settings::MediaPreferences;
use common::secret::SecretString;
use common::types::{AttemptId, ParticipantAddress, RoomId, SurfaceId};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct SessionRelay {
    registry: ParticipantRegistry,
    active: Option<Arc<dyn RoomSession>>,
    /// Attempt whose completion may still activate a room.
    pending_attempt: Option<AttemptId>,
    last_attempt: AttemptId,
    preferences: MediaPreferences,
}

impl SessionRelay {
    #[must_use]
    pub fn new(preferences: MediaPreferences) -> Self {
        Self {
            registry: ParticipantRegistry::new(),
            active: None,
            pending_attempt: None,
            last_attempt: AttemptId(0),
            preferences,
        }
    }

    pub fn set_preferences(&mut self, preferences: MediaPreferences) {
        self.preferences = preferences;
    }

    #[must_use]
    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    #[must_use]
    pub fn active_room(&self) -> Option<RoomId> {
        self.active.as_ref().map(|s| s.room_id())
    }

    /// Issue a new attempt and build the request for it.
    ///
    /// Any attempt still in flight is superseded.
    pub fn begin_join(
        &mut self,
        host: String,
        token: SecretString,
        display_name: String,
        audio: bool,
        video: bool,
    ) -> JoinRequest {
        let attempt = self.last_attempt.next();
        self.last_attempt = attempt;
        if let Some(previous) = self.pending_attempt.replace(attempt) {
            debug!(target: "relay.actor", %previous, %attempt, "Join attempt superseded");
        }

        JoinRequest {
            attempt,
            host,
            token,
            display_name,
            audio,
            video,
            hd_video: self.preferences.hd_video,
            codec: self.preferences.codec,
            topology: self.preferences.topology,
            scale_down_video: self.preferences.scale_down_video,
            monitor_qos: self.preferences.monitor_qos,
        }
    }

    /// The SDK refused `attempt` outright.
    pub fn join_rejected(&mut self, attempt: AttemptId, reason: String) -> RelayNotification {
        if self.pending_attempt == Some(attempt) {
            self.pending_attempt = None;
        }
        RelayNotification::JoinFailed { attempt, reason }
    }

    pub fn room_initialized(
        &mut self,
        attempt: AttemptId,
        session: Arc<dyn RoomSession>,
    ) -> Option<RelayNotification> {
        let room_id = session.room_id();

        if self.pending_attempt != Some(attempt) {
            info!(
                target: "relay.actor",
                %attempt,
                room_id = %room_id,
                "Room initialized for a superseded attempt, leaving it"
            );
            session.leave();
            return None;
        }
        self.pending_attempt = None;

        if let Some(previous) = self.active.take() {
            if previous.room_id() != room_id {
                info!(
                    target: "relay.actor",
                    previous = %previous.room_id(),
                    room_id = %room_id,
                    "Replacing active room"
                );
                previous.leave();
            }
        }

        self.registry.reset();
        for participant in session.remote_participants() {
            self.register(session.as_ref(), &participant);
        }

        info!(
            target: "relay.actor",
            room_id = %room_id,
            participants = self.registry.len(),
            "Room joined"
        );

        let name = session.name();
        self.active = Some(session);

        Some(RelayNotification::RoomJoined {
            room_id,
            name,
            participants: self.registry.list().to_vec(),
        })
    }

    pub fn room_init_error(
        &mut self,
        attempt: AttemptId,
        reason: String,
    ) -> Option<RelayNotification> {
        if self.pending_attempt != Some(attempt) {
            debug!(target: "relay.actor", %attempt, "Dropping failure of a superseded attempt");
            return None;
        }
        warn!(target: "relay.actor", %attempt, reason = %reason, "Join attempt failed");
        self.pending_attempt = None;
        Some(RelayNotification::JoinFailed { attempt, reason })
    }

    pub fn room_left(&mut self, room_id: &RoomId) -> Option<RelayNotification> {
        self.guard(room_id, "room_left")?;

        self.active = None;
        self.registry.reset();
        info!(target: "relay.actor", room_id = %room_id, "Room left");
        Some(RelayNotification::RoomLeft {
            room_id: room_id.clone(),
        })
    }

    /// Register a participant who joined the active room.
    ///
    /// Publishes nothing when the address is already registered, so
    /// observers see exactly one `ParticipantJoined` per registry entry.
    pub fn participant_joined(
        &mut self,
        room_id: &RoomId,
        participant: &RemoteParticipant,
    ) -> Option<RelayNotification> {
        let session = self.guard(room_id, "participant_joined")?;
        self.register(session.as_ref(), participant)?;

        let entry = self.registry.get(&participant.address)?.clone();
        debug!(
            target: "relay.actor",
            address = %entry.address,
            surface = %entry.surface,
            "Participant joined"
        );
        Some(RelayNotification::ParticipantJoined { participant: entry })
    }

    /// Drop a participant who left the active room.
    ///
    /// Publishes nothing when the address was not registered. Every
    /// `ParticipantLeft` therefore pairs with an earlier `ParticipantJoined`
    /// or a `RoomJoined` seed.
    pub fn participant_left(
        &mut self,
        room_id: &RoomId,
        participant: &RemoteParticipant,
    ) -> Option<RelayNotification> {
        self.guard(room_id, "participant_left")?;

        let entry = self.registry.remove(&participant.address)?;
        debug!(target: "relay.actor", address = %entry.address, "Participant left");
        Some(RelayNotification::ParticipantLeft { participant: entry })
    }

    pub fn local_stream_updated(&mut self, room_id: &RoomId) -> Option<RelayNotification> {
        self.guard(room_id, "local_stream_updated")?;
        debug!(target: "relay.actor", room_id = %room_id, "Local stream updated");
        Some(RelayNotification::LocalStreamUpdated {
            room_id: room_id.clone(),
        })
    }

    pub fn remote_stream_updated(
        &mut self,
        room_id: &RoomId,
        address: &ParticipantAddress,
    ) -> Option<RelayNotification> {
        let session = self.guard(room_id, "remote_stream_updated")?;

        let surface = self.registry.get(address).map(|entry| entry.surface);
        if let Some(surface) = surface {
            session.set_remote_video_surface(address, surface);
        }
        debug!(target: "relay.actor", address = %address, ?surface, "Remote stream updated");
        Some(RelayNotification::RemoteStreamUpdated {
            address: address.clone(),
            surface,
        })
    }

    pub fn message_received(
        &mut self,
        room_id: &RoomId,
        from: &ParticipantAddress,
        text: String,
    ) -> Option<RelayNotification> {
        self.guard(room_id, "message_received")?;
        Some(RelayNotification::MessageReceived {
            from: from.clone(),
            text,
        })
    }

    /// Bring mute to `muted`. Returns the resulting state, `None` without a room.
    pub fn set_mute_status(&mut self, muted: bool) -> Option<bool> {
        let session = self.active.as_ref()?;
        if session.is_muted() != muted {
            session.toggle_mute();
        }
        Some(session.is_muted())
    }

    pub fn set_speaker(&mut self, on: bool) -> Option<bool> {
        let session = self.active.as_ref()?;
        if session.is_speaker_on() != on {
            session.toggle_speaker();
        }
        Some(session.is_speaker_on())
    }

    pub fn set_video_enabled(&mut self, enabled: bool) -> Option<bool> {
        let session = self.active.as_ref()?;
        if session.has_video() != enabled {
            session.toggle_video(session.has_hd_video());
        }
        Some(session.has_video())
    }

    /// Returns `false` when there is no active room.
    pub fn switch_camera(&mut self) -> bool {
        match &self.active {
            Some(session) => {
                session.switch_camera();
                true
            }
            None => false,
        }
    }

    pub fn set_local_video_surface(&mut self) -> Option<SurfaceId> {
        let session = self.active.clone()?;
        let surface = self.registry.allocate_surface();
        session.set_local_video_surface(surface);
        Some(surface)
    }

    /// Leave the active room and forget it right away.
    ///
    /// The pending attempt is invalidated too, so a join still in flight
    /// cannot activate a room after the user asked to leave.
    pub fn leave_room(&mut self) -> Option<RoomId> {
        self.pending_attempt = None;
        self.registry.reset();

        let session = self.active.take()?;
        let room_id = session.room_id();
        session.leave();
        info!(target: "relay.actor", room_id = %room_id, "Leaving room");
        Some(room_id)
    }

    #[must_use]
    pub fn state(&self) -> RelayState {
        RelayState {
            room_id: self.active_room(),
            room_name: self.active.as_ref().and_then(|s| s.name()),
            pending_attempt: self.pending_attempt,
            participants: self.registry.list().to_vec(),
        }
    }

    /// Active session, if `room_id` names it.
    fn guard(&self, room_id: &RoomId, event: &'static str) -> Option<Arc<dyn RoomSession>> {
        match &self.active {
            Some(session) if session.room_id() == *room_id => Some(Arc::clone(session)),
            Some(session) => {
                debug!(
                    target: "relay.actor",
                    event,
                    room_id = %room_id,
                    active = %session.room_id(),
                    "Discarding event for inactive room"
                );
                None
            }
            None => {
                debug!(target: "relay.actor", event, room_id = %room_id, "Discarding event, no active room");
                None
            }
        }
    }

    fn register(
        &mut self,
        session: &dyn RoomSession,
        participant: &RemoteParticipant,
    ) -> Option<SurfaceId> {
        let surface = self.registry.add(participant)?;
        // Bound up front: a stream that starts later may never report an update.
        session.set_remote_video_surface(&participant.address, surface);
        Some(surface)
    }
}
