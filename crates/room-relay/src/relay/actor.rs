//! `RelayActor` - single task that owns the session relay.
//!
//! The actor:
//! - Processes commands from [`RelayHandle`] in order
//! - Drains SDK callbacks pushed through the [`SdkEventSink`] it attached
//! - Publishes [`RelayNotification`]s on the channel returned by `spawn`
//!
//! All relay state lives on this task, so no locks are needed.

use super::messages::{RelayCommand, RelayNotification, RelayState};
use super::session::SessionRelay;
use crate::errors::RelayError;
use crate::sdk::{RealtimeSdk, SdkEvent, SdkEventSink};
use crate::settings::MediaPreferences;

use common::secret::SecretString;
use common::types::{AttemptId, SurfaceId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

/// Command mailbox size.
const RELAY_CHANNEL_BUFFER: usize = 64;

/// Handle to a running `RelayActor`.
#[derive(Clone)]
pub struct RelayHandle {
    sender: mpsc::Sender<RelayCommand>,
    cancel_token: CancellationToken,
}

impl RelayHandle {
    /// Start joining a room.
    ///
    /// Returns the attempt id once the SDK has accepted the request. The
    /// outcome arrives later as `RoomJoined` or `JoinFailed`.
    ///
    /// # Errors
    ///
    /// `RelayError::JoinRejected` if the SDK refused the request (a
    /// `JoinFailed` notification is published as well).
    pub async fn join_room(
        &self,
        host: impl Into<String>,
        token: SecretString,
        display_name: impl Into<String>,
        audio: bool,
        video: bool,
    ) -> Result<AttemptId, RelayError> {
        let (tx, rx) = oneshot::channel();
        self.send(RelayCommand::JoinRoom {
            host: host.into(),
            token,
            display_name: display_name.into(),
            audio,
            video,
            respond_to: tx,
        })
        .await?;

        rx.await
            .map_err(|e| RelayError::Internal(format!("response receive failed: {e}")))?
    }

    /// Mute or unmute. Returns the resulting state, `None` without a room.
    pub async fn set_mute_status(&self, muted: bool) -> Result<Option<bool>, RelayError> {
        let (tx, rx) = oneshot::channel();
        self.send(RelayCommand::SetMuteStatus {
            muted,
            respond_to: tx,
        })
        .await?;
        Self::receive(rx).await
    }

    pub async fn set_speaker(&self, on: bool) -> Result<Option<bool>, RelayError> {
        let (tx, rx) = oneshot::channel();
        self.send(RelayCommand::SetSpeaker { on, respond_to: tx })
            .await?;
        Self::receive(rx).await
    }

    pub async fn set_video_enabled(&self, enabled: bool) -> Result<Option<bool>, RelayError> {
        let (tx, rx) = oneshot::channel();
        self.send(RelayCommand::SetVideoEnabled {
            enabled,
            respond_to: tx,
        })
        .await?;
        Self::receive(rx).await
    }

    pub async fn switch_camera(&self) -> Result<(), RelayError> {
        self.send(RelayCommand::SwitchCamera).await
    }

    /// Bind a new surface to the local preview.
    pub async fn set_local_video_surface(&self) -> Result<Option<SurfaceId>, RelayError> {
        let (tx, rx) = oneshot::channel();
        self.send(RelayCommand::SetLocalVideoSurface { respond_to: tx })
            .await?;
        Self::receive(rx).await
    }

    pub async fn set_media_preferences(
        &self,
        preferences: MediaPreferences,
    ) -> Result<(), RelayError> {
        self.send(RelayCommand::SetMediaPreferences { preferences })
            .await
    }

    /// Leave the active room. Does not wait for the SDK to confirm.
    pub async fn leave_room(&self) -> Result<(), RelayError> {
        self.send(RelayCommand::LeaveRoom).await
    }

    pub async fn state(&self) -> Result<RelayState, RelayError> {
        let (tx, rx) = oneshot::channel();
        self.send(RelayCommand::GetState { respond_to: tx })
            .await?;
        Self::receive(rx).await
    }

    /// Stop the actor. Any active room is left.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    async fn send(&self, command: RelayCommand) -> Result<(), RelayError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RelayError::ChannelClosed)
    }

    async fn receive<T>(rx: oneshot::Receiver<T>) -> Result<T, RelayError> {
        rx.await
            .map_err(|e| RelayError::Internal(format!("response receive failed: {e}")))
    }
}

/// The `RelayActor` implementation.
pub struct RelayActor {
    receiver: mpsc::Receiver<RelayCommand>,
    events: mpsc::UnboundedReceiver<SdkEvent>,
    events_open: bool,
    cancel_token: CancellationToken,
    sdk: Arc<dyn RealtimeSdk>,
    relay: SessionRelay,
    notifications: mpsc::UnboundedSender<RelayNotification>,
}

impl RelayActor {
    /// Attach to `sdk` and spawn the actor.
    ///
    /// Returns the handle, the notification receiver and the task join handle.
    pub fn spawn(
        sdk: Arc<dyn RealtimeSdk>,
        preferences: MediaPreferences,
        cancel_token: CancellationToken,
    ) -> (
        RelayHandle,
        mpsc::UnboundedReceiver<RelayNotification>,
        JoinHandle<()>,
    ) {
        let (sender, receiver) = mpsc::channel(RELAY_CHANNEL_BUFFER);
        let (notifications, notification_rx) = mpsc::unbounded_channel();
        let (sink, events) = SdkEventSink::channel();

        sdk.attach(sink);

        let actor = Self {
            receiver,
            events,
            events_open: true,
            cancel_token: cancel_token.clone(),
            sdk,
            relay: SessionRelay::new(preferences),
            notifications,
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = RelayHandle {
            sender,
            cancel_token,
        };

        (handle, notification_rx, task_handle)
    }

    #[instrument(skip_all, name = "relay.actor")]
    async fn run(mut self) {
        info!(target: "relay.actor", "RelayActor started");

        loop {
            // SDK events queued before a command are applied before it.
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    info!(target: "relay.actor", "RelayActor received cancellation signal");
                    break;
                }

                event = self.events.recv(), if self.events_open => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            warn!(target: "relay.actor", "SDK event channel closed");
                            self.events_open = false;
                        }
                    }
                }

                command = self.receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command),
                        None => {
                            info!(target: "relay.actor", "All relay handles dropped, exiting");
                            break;
                        }
                    }
                }
            }
        }

        if let Some(room_id) = self.relay.leave_room() {
            debug!(target: "relay.actor", room_id = %room_id, "Left room on shutdown");
        }

        info!(target: "relay.actor", "RelayActor stopped");
    }

    fn handle_command(&mut self, command: RelayCommand) {
        match command {
            RelayCommand::JoinRoom {
                host,
                token,
                display_name,
                audio,
                video,
                respond_to,
            } => {
                let result = self.handle_join(host, token, display_name, audio, video);
                let _ = respond_to.send(result);
            }

            RelayCommand::SetMuteStatus { muted, respond_to } => {
                let _ = respond_to.send(self.relay.set_mute_status(muted));
            }

            RelayCommand::SetSpeaker { on, respond_to } => {
                let _ = respond_to.send(self.relay.set_speaker(on));
            }

            RelayCommand::SetVideoEnabled {
                enabled,
                respond_to,
            } => {
                let _ = respond_to.send(self.relay.set_video_enabled(enabled));
            }

            RelayCommand::SwitchCamera => {
                self.relay.switch_camera();
            }

            RelayCommand::SetLocalVideoSurface { respond_to } => {
                let _ = respond_to.send(self.relay.set_local_video_surface());
            }

            RelayCommand::SetMediaPreferences { preferences } => {
                debug!(target: "relay.actor", ?preferences, "Media preferences updated");
                self.relay.set_preferences(preferences);
            }

            RelayCommand::LeaveRoom => {
                self.relay.leave_room();
            }

            RelayCommand::GetState { respond_to } => {
                let _ = respond_to.send(self.relay.state());
            }
        }
    }

    #[instrument(skip_all, fields(host = %host))]
    fn handle_join(
        &mut self,
        host: String,
        token: SecretString,
        display_name: String,
        audio: bool,
        video: bool,
    ) -> Result<AttemptId, RelayError> {
        let request = self
            .relay
            .begin_join(host, token, display_name, audio, video);
        let attempt = request.attempt;

        info!(
            target: "relay.actor",
            %attempt,
            codec = request.codec.as_str(),
            topology = request.topology.as_str(),
            hd_video = request.hd_video,
            "Joining room"
        );

        match self.sdk.join_room(request) {
            Ok(()) => Ok(attempt),
            Err(e) => {
                warn!(target: "relay.actor", %attempt, error = %e, "SDK rejected join");
                let notification = self.relay.join_rejected(attempt, e.to_string());
                self.publish(notification);
                Err(RelayError::JoinRejected(e))
            }
        }
    }

    fn handle_event(&mut self, event: SdkEvent) {
        trace!(target: "relay.actor", event = event.kind(), "SDK event");

        let notification = match event {
            SdkEvent::RoomInitialized { attempt, session } => {
                self.relay.room_initialized(attempt, session)
            }
            SdkEvent::RoomInitError { attempt, reason }
            | SdkEvent::JoinFailed { attempt, reason } => {
                self.relay.room_init_error(attempt, reason)
            }
            SdkEvent::RoomLeft { room_id } => self.relay.room_left(&room_id),
            SdkEvent::ParticipantJoined {
                room_id,
                participant,
            } => self.relay.participant_joined(&room_id, &participant),
            SdkEvent::ParticipantLeft {
                room_id,
                participant,
            } => self.relay.participant_left(&room_id, &participant),
            SdkEvent::LocalStreamUpdated { room_id } => self.relay.local_stream_updated(&room_id),
            SdkEvent::RemoteStreamUpdated { room_id, address } => {
                self.relay.remote_stream_updated(&room_id, &address)
            }
            SdkEvent::MessageReceived {
                room_id,
                from,
                text,
            } => self.relay.message_received(&room_id, &from, text),
            SdkEvent::Log { message } => {
                trace!(target: "relay.sdk", "{message}");
                None
            }
        };

        if let Some(notification) = notification {
            self.publish(notification);
        }
    }

    fn publish(&self, notification: RelayNotification) {
        if self.notifications.send(notification).is_err() {
            debug!(target: "relay.actor", "No observer, notification dropped");
        }
    }
}
