//! Room Relay Library
//!
//! Client-side plumbing around a real-time audio/video conferencing SDK:
//!
//! - Session relay: takes SDK callbacks, guards them against the active room
//!   and keeps observers informed
//! - Participant registry: ordered participant to rendering-surface map
//! - Room token client: fetches or creates room credentials on the
//!   application server
//! - Settings: persisted user preferences with per-key defaults
//!
//! # Architecture
//!
//! ```text
//! RelayHandle ──commands──▶ RelayActor ──join──▶ RealtimeSdk
//!                              ▲   │
//!             SdkEventSink ────┘   └──▶ RelayNotification (observer)
//! ```
//!
//! The SDK itself is external and sits behind the traits in [`sdk`].
//!
//! # Modules
//!
//! - [`relay`] - Relay actor, state machine and participant registry
//! - [`sdk`] - SDK boundary traits and event channel
//! - [`token_client`] - Application server client
//! - [`settings`] - Preference store
//! - [`config`] - Configuration from environment
//! - [`errors`] - Relay and SDK error types

pub mod config;
pub mod errors;
pub mod relay;
pub mod sdk;
pub mod settings;
pub mod token_client;
