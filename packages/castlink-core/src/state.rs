//! Core playback state types.
//!
//! [`PlaybackState`] is the process-wide description of what is playing and
//! where it renders. Its [`Location`] field is the single source of truth for
//! "which adapter is active": every control path resolves the adapter from it.

use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::now_millis;

/// One of the supported remote rendering protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Google Cast receivers.
    Chromecast,
    /// Apple AirPlay receivers.
    Airplay,
    /// UPnP/DLNA media renderers.
    Dlna,
}

impl Backend {
    /// All backends, in discovery wiring order.
    pub const ALL: [Backend; 3] = [Backend::Chromecast, Backend::Airplay, Backend::Dlna];

    /// Wire identifier (`chromecast`, `airplay`, `dlna`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Chromecast => "chromecast",
            Backend::Airplay => "airplay",
            Backend::Dlna => "dlna",
        }
    }

    /// Human-readable protocol name used in error log messages.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Backend::Chromecast => "Chromecast",
            Backend::Airplay => "AirPlay",
            Backend::Dlna => "DLNA",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromecast" => Ok(Backend::Chromecast),
            "airplay" => Ok(Backend::Airplay),
            "dlna" => Ok(Backend::Dlna),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

/// Where the video is currently rendering.
///
/// Serialized as `local`, `<backend>-pending` or `<backend>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Location {
    /// Rendering in the local player. Initial and terminal state.
    #[default]
    Local,
    /// A device was selected and the connect request is in flight.
    Pending(Backend),
    /// Connected; the status poller keeps state in sync with the device.
    Connected(Backend),
}

impl Location {
    /// Returns the backend for pending and connected locations.
    #[must_use]
    pub fn backend(self) -> Option<Backend> {
        match self {
            Location::Local => None,
            Location::Pending(b) | Location::Connected(b) => Some(b),
        }
    }

    /// Returns the backend only once the connection is established.
    ///
    /// The facade and the status poller resolve adapters through this, so
    /// commands issued while pending are no-ops.
    #[must_use]
    pub fn connected_backend(self) -> Option<Backend> {
        match self {
            Location::Connected(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_local(self) -> bool {
        self == Location::Local
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local => f.write_str("local"),
            Location::Pending(b) => write!(f, "{b}-pending"),
            Location::Connected(b) => write!(f, "{b}"),
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "local" {
            return Ok(Location::Local);
        }
        match s.strip_suffix("-pending") {
            Some(backend) => backend.parse().map(Location::Pending),
            None => s.parse().map(Location::Connected),
        }
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.to_string()
    }
}

impl TryFrom<String> for Location {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Process-wide playback state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub location: Location,
    /// Playback position in seconds.
    pub current_time: f64,
    pub is_paused: bool,
    /// Volume in `0.0..=1.0`.
    pub volume: f64,
    /// Identifies the content being played.
    pub info_hash: Option<String>,
    /// Position the local player should resume at after a fallback to local.
    pub jump_to_time: Option<f64>,
    /// Identifies the current connection attempt. Completions carrying an
    /// older session are dropped.
    #[serde(skip)]
    pub(crate) session: Option<Uuid>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            location: Location::Local,
            current_time: 0.0,
            is_paused: true,
            volume: 1.0,
            info_hash: None,
            jump_to_time: None,
            session: None,
        }
    }
}

/// Playback fields pulled from a device by a status poll.
///
/// `volume` is `None` for backends that cannot report it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSnapshot {
    pub current_time: f64,
    pub is_paused: bool,
    pub volume: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Error Log
// ─────────────────────────────────────────────────────────────────────────────

/// A connection failure shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Unix timestamp in milliseconds.
    pub time: u64,
    pub message: String,
}

/// Append-only, ordered log of connection failures. Never pruned.
#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: RwLock<Vec<ErrorEntry>>,
}

impl ErrorLog {
    /// Appends a message stamped with the current time and returns the entry.
    pub fn push(&self, message: impl Into<String>) -> ErrorEntry {
        let entry = ErrorEntry {
            time: now_millis(),
            message: message.into(),
        };
        self.entries.write().push(entry.clone());
        entry
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<ErrorEntry> {
        self.entries.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
