//! Mock room session.
//!
//! Device state flips on every toggle and every call is counted, so tests can
//! assert both the resulting state and how many SDK calls the relay made.
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_test_utils::MockRoomSession;
//!
//! let session = MockRoomSession::new("roomA")
//!     .with_name("Standup")
//!     .with_hd_video(true);
//!
//! // hand session.as_session() to the relay, then:
//! assert_eq!(session.mute_toggles(), 1);
//! ```

use common::types::{ParticipantAddress, RoomId, SurfaceId};
use room_relay::sdk::{RemoteParticipant, RoomSession};
use std::sync::{Arc, Mutex};

/// Mock room session. Clones share state.
#[derive(Debug, Clone)]
pub struct MockRoomSession {
    inner: Arc<Mutex<MockRoomSessionInner>>,
}

#[derive(Debug, Default)]
struct MockRoomSessionInner {
    room_id: String,
    name: Option<String>,
    remote: Vec<RemoteParticipant>,
    muted: bool,
    speaker_on: bool,
    video: bool,
    hd_video: bool,
    mute_toggles: usize,
    speaker_toggles: usize,
    /// HD flag passed to each video toggle.
    video_toggles: Vec<bool>,
    camera_switches: usize,
    remote_surfaces: Vec<(ParticipantAddress, SurfaceId)>,
    local_surface: Option<SurfaceId>,
    leave_count: usize,
}

impl MockRoomSession {
    /// Create a session for `room_id` with every device off.
    #[must_use]
    pub fn new(room_id: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockRoomSessionInner {
                room_id: room_id.to_string(),
                ..MockRoomSessionInner::default()
            })),
        }
    }

    #[must_use]
    pub fn with_name(self, name: &str) -> Self {
        self.inner.lock().unwrap().name = Some(name.to_string());
        self
    }

    /// Add a participant that is already in the room.
    #[must_use]
    pub fn with_participant(self, participant: RemoteParticipant) -> Self {
        self.inner.lock().unwrap().remote.push(participant);
        self
    }

    #[must_use]
    pub fn with_muted(self, muted: bool) -> Self {
        self.inner.lock().unwrap().muted = muted;
        self
    }

    #[must_use]
    pub fn with_speaker(self, on: bool) -> Self {
        self.inner.lock().unwrap().speaker_on = on;
        self
    }

    #[must_use]
    pub fn with_video(self, enabled: bool) -> Self {
        self.inner.lock().unwrap().video = enabled;
        self
    }

    #[must_use]
    pub fn with_hd_video(self, hd: bool) -> Self {
        self.inner.lock().unwrap().hd_video = hd;
        self
    }

    /// Shared handle to give to the relay.
    #[must_use]
    pub fn as_session(&self) -> Arc<dyn RoomSession> {
        Arc::new(self.clone())
    }

    pub fn mute_toggles(&self) -> usize {
        self.inner.lock().unwrap().mute_toggles
    }

    pub fn speaker_toggles(&self) -> usize {
        self.inner.lock().unwrap().speaker_toggles
    }

    pub fn video_toggles(&self) -> Vec<bool> {
        self.inner.lock().unwrap().video_toggles.clone()
    }

    pub fn camera_switches(&self) -> usize {
        self.inner.lock().unwrap().camera_switches
    }

    pub fn remote_surfaces(&self) -> Vec<(ParticipantAddress, SurfaceId)> {
        self.inner.lock().unwrap().remote_surfaces.clone()
    }

    pub fn local_surface(&self) -> Option<SurfaceId> {
        self.inner.lock().unwrap().local_surface
    }

    pub fn leave_count(&self) -> usize {
        self.inner.lock().unwrap().leave_count
    }
}

impl RoomSession for MockRoomSession {
    fn room_id(&self) -> RoomId {
        RoomId::new(self.inner.lock().unwrap().room_id.clone())
    }

    fn name(&self) -> Option<String> {
        self.inner.lock().unwrap().name.clone()
    }

    fn remote_participants(&self) -> Vec<RemoteParticipant> {
        self.inner.lock().unwrap().remote.clone()
    }

    fn is_muted(&self) -> bool {
        self.inner.lock().unwrap().muted
    }

    fn toggle_mute(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.muted = !inner.muted;
        inner.mute_toggles += 1;
    }

    fn is_speaker_on(&self) -> bool {
        self.inner.lock().unwrap().speaker_on
    }

    fn toggle_speaker(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.speaker_on = !inner.speaker_on;
        inner.speaker_toggles += 1;
    }

    fn has_video(&self) -> bool {
        self.inner.lock().unwrap().video
    }

    fn has_hd_video(&self) -> bool {
        self.inner.lock().unwrap().hd_video
    }

    fn toggle_video(&self, hd_video: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.video = !inner.video;
        inner.video_toggles.push(hd_video);
    }

    fn switch_camera(&self) {
        self.inner.lock().unwrap().camera_switches += 1;
    }

    fn set_remote_video_surface(&self, address: &ParticipantAddress, surface: SurfaceId) {
        self.inner
            .lock()
            .unwrap()
            .remote_surfaces
            .push((address.clone(), surface));
    }

    fn set_local_video_surface(&self, surface: SurfaceId) {
        self.inner.lock().unwrap().local_surface = Some(surface);
    }

    fn leave(&self) {
        self.inner.lock().unwrap().leave_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles_flip_state_and_count() {
        let session = MockRoomSession::new("roomA").with_hd_video(true);

        session.toggle_mute();
        session.toggle_video(session.has_hd_video());

        assert!(session.is_muted());
        assert!(session.has_video());
        assert_eq!(session.mute_toggles(), 1);
        assert_eq!(session.video_toggles(), vec![true]);
    }

    #[test]
    fn test_clones_share_state() {
        let session = MockRoomSession::new("roomA");
        let handle = session.as_session();

        handle.leave();
        assert_eq!(session.leave_count(), 1);
        assert_eq!(handle.room_id(), RoomId::from("roomA"));
    }
}
