//! Mock conferencing SDK.
//!
//! Records every join request and keeps the event sink the relay attached,
//! so a test can play the SDK's side: complete or fail joins, and deliver
//! room and participant callbacks.

use crate::mock_session::MockRoomSession;
use common::types::{AttemptId, ParticipantAddress, RoomId};
use room_relay::errors::SdkError;
use room_relay::sdk::{JoinRequest, RealtimeSdk, RemoteParticipant, SdkEvent, SdkEventSink};
use std::sync::{Arc, Mutex};

/// Mock SDK. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockSdk {
    inner: Arc<Mutex<MockSdkInner>>,
}

#[derive(Debug, Default)]
struct MockSdkInner {
    sink: Option<SdkEventSink>,
    attach_count: usize,
    requests: Vec<JoinRequest>,
    /// Reject joins synchronously with this reason.
    reject_with: Option<String>,
}

impl MockSdk {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `join_room` fail synchronously.
    #[must_use]
    pub fn with_join_rejection(self, reason: &str) -> Self {
        self.inner.lock().unwrap().reject_with = Some(reason.to_string());
        self
    }

    /// Shared handle to give to the relay.
    #[must_use]
    pub fn as_sdk(&self) -> Arc<dyn RealtimeSdk> {
        Arc::new(self.clone())
    }

    pub fn attach_count(&self) -> usize {
        self.inner.lock().unwrap().attach_count
    }

    pub fn join_requests(&self) -> Vec<JoinRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Option<JoinRequest> {
        self.inner.lock().unwrap().requests.last().cloned()
    }

    /// Deliver an event to the relay.
    ///
    /// # Panics
    ///
    /// Panics if the relay never attached.
    pub fn emit(&self, event: SdkEvent) -> bool {
        let sink = self
            .inner
            .lock()
            .unwrap()
            .sink
            .clone()
            .expect("MockSdk not attached to a relay");
        sink.emit(event)
    }

    pub fn complete_join(&self, attempt: AttemptId, session: &MockRoomSession) -> bool {
        self.emit(SdkEvent::RoomInitialized {
            attempt,
            session: session.as_session(),
        })
    }

    pub fn fail_join(&self, attempt: AttemptId, reason: &str) -> bool {
        self.emit(SdkEvent::RoomInitError {
            attempt,
            reason: reason.to_string(),
        })
    }

    pub fn room_left(&self, room_id: &str) -> bool {
        self.emit(SdkEvent::RoomLeft {
            room_id: RoomId::from(room_id),
        })
    }

    pub fn participant_joined(&self, room_id: &str, participant: RemoteParticipant) -> bool {
        self.emit(SdkEvent::ParticipantJoined {
            room_id: RoomId::from(room_id),
            participant,
        })
    }

    pub fn participant_left(&self, room_id: &str, participant: RemoteParticipant) -> bool {
        self.emit(SdkEvent::ParticipantLeft {
            room_id: RoomId::from(room_id),
            participant,
        })
    }

    pub fn remote_stream_updated(&self, room_id: &str, address: &str) -> bool {
        self.emit(SdkEvent::RemoteStreamUpdated {
            room_id: RoomId::from(room_id),
            address: ParticipantAddress::from(address),
        })
    }

    pub fn message(&self, room_id: &str, from: &str, text: &str) -> bool {
        self.emit(SdkEvent::MessageReceived {
            room_id: RoomId::from(room_id),
            from: ParticipantAddress::from(from),
            text: text.to_string(),
        })
    }

    pub fn log(&self, message: &str) -> bool {
        self.emit(SdkEvent::Log {
            message: message.to_string(),
        })
    }
}

impl RealtimeSdk for MockSdk {
    fn attach(&self, sink: SdkEventSink) {
        let mut inner = self.inner.lock().unwrap();
        inner.sink = Some(sink);
        inner.attach_count += 1;
    }

    fn join_room(&self, request: JoinRequest) -> Result<(), SdkError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request);
        match &inner.reject_with {
            Some(reason) => Err(SdkError::JoinRejected(reason.clone())),
            None => Ok(()),
        }
    }
}
