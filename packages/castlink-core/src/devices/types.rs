//! Domain types shared by the backend device libraries.

use serde::Serialize;

/// Out-of-band notification raised by a device's control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// The control channel failed.
    Error(String),
    /// The device closed the control channel.
    Disconnect,
}

/// Menu entry describing a discovered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub id: String,
    pub name: String,
}

/// Media player state as reported by Chromecast and DLNA renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerState {
    Idle,
    Buffering,
    Playing,
    Paused,
}

/// What a renderer is asked to load.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRequest {
    /// URL the renderer fetches the media from.
    pub url: String,
    /// MIME type of the media.
    pub content_type: String,
    /// Title shown on the renderer.
    pub title: String,
}

/// Volume block of a Chromecast media status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromecastVolume {
    pub level: f64,
    pub muted: bool,
}

/// Media status reported by a Chromecast receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromecastStatus {
    pub player_state: PlayerState,
    /// Position in seconds.
    pub current_time: f64,
    pub volume: ChromecastVolume,
}

/// Playback info reported by an AirPlay receiver.
///
/// AirPlay has no pause flag and does not report volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirPlayPlaybackInfo {
    /// Playback rate; `0.0` means paused.
    pub rate: f64,
    /// Position in seconds.
    pub position: f64,
}

/// Transport status reported by a DLNA renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DlnaStatus {
    pub player_state: PlayerState,
    /// Position in seconds.
    pub current_time: f64,
    /// Volume in `0.0..=1.0`.
    pub volume_level: f64,
}
