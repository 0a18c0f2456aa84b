//! Fixed protocol constants that should NOT be changed.
//!
//! These values are dictated by the renderer protocols or by the way the
//! local player hands playback off to a remote device. Tunable values live in
//! [`CastConfig`](crate::config::CastConfig).

// ─────────────────────────────────────────────────────────────────────────────
// AirPlay
// ─────────────────────────────────────────────────────────────────────────────

/// Width of the AirPlay volume scale in device units.
///
/// Receivers accept `-30.0` (quietest) through `0.0` (full volume).
pub const AIRPLAY_VOLUME_RANGE_DB: f64 = 30.0;

/// HTTP status an AirPlay receiver returns when it accepted a `play` request.
pub const AIRPLAY_PLAY_ACCEPTED: u16 = 200;

/// Playback rate that resumes AirPlay playback.
pub const AIRPLAY_RATE_PLAYING: f64 = 1.0;

/// Playback rate that pauses AirPlay playback.
pub const AIRPLAY_RATE_PAUSED: f64 = 0.0;

// ─────────────────────────────────────────────────────────────────────────────
// Media
// ─────────────────────────────────────────────────────────────────────────────

/// Content type announced to Chromecast and DLNA renderers.
pub const MEDIA_CONTENT_TYPE: &str = "video/mp4";

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default interval between status polls (milliseconds).
pub const DEFAULT_STATUS_POLL_INTERVAL_MS: u64 = 1000;

/// Default minimum position (seconds) before DLNA reconnects resume mid-stream.
pub const DEFAULT_RESUME_THRESHOLD_SECS: f64 = 10.0;

/// Default application name, prefixed to remote media titles.
pub const DEFAULT_APP_NAME: &str = "CastLink";

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 100;
