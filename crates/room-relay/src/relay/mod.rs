//! Room session relay.
//!
//! Sits between the conferencing SDK and the application: takes SDK
//! callbacks, checks them against the active room, keeps the participant
//! registry in step and tells the observer what changed.
//!
//! # Components
//!
//! - [`RelayActor`] / [`RelayHandle`]: the task and its command interface
//! - [`SessionRelay`]: the state machine the actor drives
//! - [`ParticipantRegistry`]: ordered participant to surface map

pub mod actor;
pub mod messages;
pub mod registry;
pub mod session;

pub use actor::{RelayActor, RelayHandle};
pub use messages::{RelayCommand, RelayNotification, RelayState};
pub use registry::{ParticipantRegistry, RegisteredParticipant};
pub use session::SessionRelay;
