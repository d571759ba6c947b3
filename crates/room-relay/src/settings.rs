//! Persisted user preferences.
//!
//! Settings are plain key/value pairs (booleans and strings) with no
//! transactional semantics: the last write wins, and every read falls back to
//! a default when the key has never been written. Reads never write.
//!
//! Storage is pluggable through [`SettingsStore`]. [`MemorySettingsStore`]
//! keeps values for the life of the process; [`FileSettingsStore`] writes
//! through to a JSON file on every change.

use common::secret::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix applied to every persisted key.
pub const SETTINGS_KEY_PREFIX: &str = "RoomRelay_";

/// Errors from reading or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for setting {key}")]
    InvalidValue { key: SettingKey, value: String },
}

/// Every preference the relay knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    HdVideo,
    DebugLogging,
    MonitorQos,
    ScaleDownVideo,
    PreferredCodec,
    ConferenceTopology,
    ServerAddress,
    UserName,
    Password,
}

/// How a setting's value is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    /// On/off switch.
    Flag,
    /// One of a fixed set of strings.
    Choice,
    /// Free-form text override.
    Text,
}

impl SettingKey {
    /// All keys, in display order.
    pub const ALL: [SettingKey; 9] = [
        SettingKey::HdVideo,
        SettingKey::DebugLogging,
        SettingKey::MonitorQos,
        SettingKey::ScaleDownVideo,
        SettingKey::PreferredCodec,
        SettingKey::ConferenceTopology,
        SettingKey::ServerAddress,
        SettingKey::UserName,
        SettingKey::Password,
    ];

    /// Short machine name, used on the command line and in storage keys.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::HdVideo => "hd_video",
            SettingKey::DebugLogging => "debug_logging",
            SettingKey::MonitorQos => "monitor_qos",
            SettingKey::ScaleDownVideo => "scale_down_video",
            SettingKey::PreferredCodec => "preferred_codec",
            SettingKey::ConferenceTopology => "conference_topology",
            SettingKey::ServerAddress => "server_address",
            SettingKey::UserName => "user_name",
            SettingKey::Password => "password",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SettingKey::HdVideo => "Enable HD video",
            SettingKey::DebugLogging => "Enable debug logs",
            SettingKey::MonitorQos => "Monitor call quality",
            SettingKey::ScaleDownVideo => "Scale down video resolution",
            SettingKey::PreferredCodec => "Preferred video codec",
            SettingKey::ConferenceTopology => "Conference topology",
            SettingKey::ServerAddress => "Server",
            SettingKey::UserName => "User Name",
            SettingKey::Password => "Password",
        }
    }

    #[must_use]
    pub fn kind(self) -> SettingKind {
        match self {
            SettingKey::HdVideo
            | SettingKey::DebugLogging
            | SettingKey::MonitorQos
            | SettingKey::ScaleDownVideo => SettingKind::Flag,
            SettingKey::PreferredCodec | SettingKey::ConferenceTopology => SettingKind::Choice,
            SettingKey::ServerAddress | SettingKey::UserName | SettingKey::Password => {
                SettingKind::Text
            }
        }
    }

    /// Key under which the value is persisted.
    #[must_use]
    pub fn storage_key(self) -> String {
        format!("{SETTINGS_KEY_PREFIX}{}", self.name())
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// Preferred video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoCodec {
    #[serde(rename = "VP8")]
    Vp8,
    #[default]
    #[serde(rename = "VP9")]
    Vp9,
}

impl VideoCodec {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VideoCodec::Vp8 => "VP8",
            VideoCodec::Vp9 => "VP9",
        }
    }
}

impl FromStr for VideoCodec {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VP8" => Ok(VideoCodec::Vp8),
            "VP9" => Ok(VideoCodec::Vp9),
            _ => Err(()),
        }
    }
}

/// Media routing topology for the conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConferenceTopology {
    #[serde(rename = "MESH")]
    Mesh,
    #[default]
    #[serde(rename = "SFU")]
    Sfu,
}

impl ConferenceTopology {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConferenceTopology::Mesh => "MESH",
            ConferenceTopology::Sfu => "SFU",
        }
    }
}

impl FromStr for ConferenceTopology {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MESH" => Ok(ConferenceTopology::Mesh),
            "SFU" => Ok(ConferenceTopology::Sfu),
            _ => Err(()),
        }
    }
}

/// A stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

/// Backing storage for settings.
pub trait SettingsStore: Send + Sync {
    /// Read a raw value.
    fn get(&self, key: &str) -> Option<SettingValue>;

    /// Write a raw value, replacing whatever was there.
    fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError>;
}

/// Process-lifetime settings storage.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, SettingValue>>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON-file settings storage with write-through on every change.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, SettingValue>>,
}

impl FileSettingsStore {
    /// Open the store at `path`, loading existing values if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(
            target: "relay.settings",
            path = %path.display(),
            entries = values.len(),
            "Settings loaded"
        );

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, SettingValue>) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value);
        self.persist(&values)
    }
}

/// Fallbacks for the text overrides.
#[derive(Clone)]
pub struct TextDefaults {
    pub server_address: String,
    pub user_name: String,
    pub password: SecretString,
}

impl fmt::Debug for TextDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextDefaults")
            .field("server_address", &self.server_address)
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            server_address: String::new(),
            user_name: String::new(),
            password: SecretString::from(""),
        }
    }
}

/// Media options applied to every join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaPreferences {
    pub hd_video: bool,
    pub codec: VideoCodec,
    pub topology: ConferenceTopology,
    pub scale_down_video: bool,
    pub monitor_qos: bool,
}

impl Default for MediaPreferences {
    fn default() -> Self {
        Self {
            hd_video: true,
            codec: VideoCodec::default(),
            topology: ConferenceTopology::default(),
            scale_down_video: false,
            monitor_qos: false,
        }
    }
}

/// Typed view over a [`SettingsStore`].
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn SettingsStore>,
    defaults: TextDefaults,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Settings {
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>, defaults: TextDefaults) -> Self {
        Self { store, defaults }
    }

    /// In-memory settings with empty text defaults.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySettingsStore::new()), TextDefaults::default())
    }

    /// Whether a flag is on. HD video defaults to on, every other flag to off.
    /// Non-flag keys always read as off.
    #[must_use]
    pub fn is_set(&self, key: SettingKey) -> bool {
        if key.kind() != SettingKind::Flag {
            return false;
        }
        match self.store.get(&key.storage_key()) {
            Some(SettingValue::Bool(on)) => on,
            Some(SettingValue::Text(raw)) => parse_bool(&raw).unwrap_or(key == SettingKey::HdVideo),
            None => key == SettingKey::HdVideo,
        }
    }

    /// Turn a flag on or off.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not a flag or the store cannot persist the value.
    pub fn set_flag(&self, key: SettingKey, on: bool) -> Result<(), SettingsError> {
        if key.kind() != SettingKind::Flag {
            return Err(SettingsError::InvalidValue {
                key,
                value: on.to_string(),
            });
        }
        debug!(target: "relay.settings", setting = %key, on, "Flag updated");
        self.store.set(&key.storage_key(), SettingValue::Bool(on))
    }

    /// Preferred codec; VP9 unless VP8 was chosen.
    #[must_use]
    pub fn preferred_codec(&self) -> VideoCodec {
        self.choice(SettingKey::PreferredCodec)
    }

    pub fn set_preferred_codec(&self, codec: VideoCodec) -> Result<(), SettingsError> {
        self.store.set(
            &SettingKey::PreferredCodec.storage_key(),
            SettingValue::Text(codec.as_str().to_string()),
        )
    }

    /// Conference topology; SFU unless mesh was chosen.
    #[must_use]
    pub fn topology(&self) -> ConferenceTopology {
        self.choice(SettingKey::ConferenceTopology)
    }

    pub fn set_topology(&self, topology: ConferenceTopology) -> Result<(), SettingsError> {
        self.store.set(
            &SettingKey::ConferenceTopology.storage_key(),
            SettingValue::Text(topology.as_str().to_string()),
        )
    }

    /// A text override. Empty or missing values fall back to the default.
    ///
    /// Reads never write: the defaults come from the environment and must
    /// keep tracking it, and the password must not land in the store file
    /// unless it was set explicitly.
    #[must_use]
    pub fn text(&self, key: SettingKey) -> String {
        match self.store.get(&key.storage_key()) {
            Some(SettingValue::Text(value)) if !value.is_empty() => value,
            _ => self.text_default(key),
        }
    }

    /// The password override, kept secret.
    #[must_use]
    pub fn password(&self) -> SecretString {
        SecretString::from(self.text(SettingKey::Password))
    }

    pub fn set_text(&self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        if key.kind() != SettingKind::Text {
            return Err(SettingsError::InvalidValue {
                key,
                value: value.to_string(),
            });
        }
        debug!(target: "relay.settings", setting = %key, "Text setting updated");
        self.store
            .set(&key.storage_key(), SettingValue::Text(value.to_string()))
    }

    /// Parse and store a value given as a string (command-line input).
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if `raw` does not parse for the key's kind.
    pub fn set_from_str(&self, key: SettingKey, raw: &str) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key,
            value: raw.to_string(),
        };
        match key {
            SettingKey::PreferredCodec => {
                self.set_preferred_codec(raw.parse().map_err(|()| invalid())?)
            }
            SettingKey::ConferenceTopology => {
                self.set_topology(raw.parse().map_err(|()| invalid())?)
            }
            _ if key.kind() == SettingKind::Flag => {
                self.set_flag(key, parse_bool(raw).ok_or_else(invalid)?)
            }
            _ => self.set_text(key, raw),
        }
    }

    /// Current value of every key, rendered for display. The password is masked.
    #[must_use]
    pub fn describe(&self) -> Vec<(SettingKey, String)> {
        SettingKey::ALL
            .into_iter()
            .map(|key| {
                let shown = match key {
                    SettingKey::PreferredCodec => self.preferred_codec().as_str().to_string(),
                    SettingKey::ConferenceTopology => self.topology().as_str().to_string(),
                    SettingKey::Password => {
                        if self.password().expose_secret().is_empty() {
                            String::new()
                        } else {
                            "********".to_string()
                        }
                    }
                    _ if key.kind() == SettingKind::Flag => {
                        let shown = if self.is_set(key) { "ON" } else { "OFF" };
                        shown.to_string()
                    }
                    _ => self.text(key),
                };
                (key, shown)
            })
            .collect()
    }

    /// Media options for the next join.
    #[must_use]
    pub fn media_preferences(&self) -> MediaPreferences {
        MediaPreferences {
            hd_video: self.is_set(SettingKey::HdVideo),
            codec: self.preferred_codec(),
            topology: self.topology(),
            scale_down_video: self.is_set(SettingKey::ScaleDownVideo),
            monitor_qos: self.is_set(SettingKey::MonitorQos),
        }
    }

    fn choice<T: FromStr + Default>(&self, key: SettingKey) -> T {
        match self.store.get(&key.storage_key()) {
            Some(SettingValue::Text(raw)) => raw.parse().unwrap_or_else(|_| {
                warn!(target: "relay.settings", setting = %key, value = %raw, "Unrecognized stored value, using default");
                T::default()
            }),
            _ => T::default(),
        }
    }

    fn text_default(&self, key: SettingKey) -> String {
        match key {
            SettingKey::ServerAddress => self.defaults.server_address.clone(),
            SettingKey::UserName => self.defaults.user_name.clone(),
            SettingKey::Password => self.defaults.password.expose_secret().to_string(),
            _ => String::new(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
