//! CastLink Core - remote playback control plane.
//!
//! This crate redirects a single application-level playback state between the
//! local player and one of three kinds of network renderer: Chromecast, AirPlay
//! and DLNA. Discovery libraries announce devices, the user picks one from a
//! menu, and from then on play/pause/seek/volume commands go to that device
//! while its status is polled back into the shared state. Any failure drops
//! playback back to local at the last known position.
//!
//! # Architecture
//!
//! - [`services`]: [`CastController`] (the public API) and the [`StatusPoller`]
//! - [`adapters`]: One [`DeviceAdapter`] per backend, hiding library differences
//! - [`context`]: Shared state and the connection state machine transitions
//! - [`devices`]: Traits the backend device libraries are consumed through
//! - [`registry`]: Append-only per-backend device lists
//! - [`discovery`]: Channels discovery libraries announce devices on
//! - [`events`]: Event system for notifying the UI layer
//! - [`state`]: Playback state, locations and the error log
//! - [`config`]: YAML/env configuration
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`TaskSpawner`](runtime::TaskSpawner): Spawning background tasks
//! - [`EventEmitter`](events::EventEmitter): Emitting domain events
//! - [`MediaLibrary`](media::MediaLibrary): Media URL and titles for renderers
//! - [`ChromecastDevice`], [`AirPlayDevice`], [`DlnaDevice`]: Backend device libraries

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod context;
pub mod devices;
pub mod discovery;
pub mod error;
pub mod events;
pub mod media;
pub mod protocol_constants;
pub mod registry;
pub mod runtime;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types at the crate root
pub use adapters::{AdapterSet, DeviceAdapter, RateControl};
pub use config::CastConfig;
pub use context::CastContext;
pub use devices::{
    AirPlayDevice, AirPlayPlaybackInfo, ChromecastDevice, ChromecastStatus, ChromecastVolume,
    Device, DeviceEvent, DeviceSummary, DlnaDevice, DlnaStatus, MediaRequest, PlayerState,
};
pub use discovery::{discovery_channels, DiscoveryAnnouncer, DiscoveryFeeds};
pub use error::{CastError, CastResult, DeviceError, DeviceResult, ErrorCode};
pub use events::{
    BroadcastEvent, BroadcastEventBridge, DiscoveryEvent, EventEmitter, LoggingEventEmitter,
    NoopEventEmitter, PlaybackEvent,
};
pub use media::{MediaLibrary, StaticMediaLibrary};
pub use runtime::{TaskSpawner, TokioSpawner};
pub use services::{CastController, CastMenu, StatusPoller};
pub use state::{Backend, ErrorEntry, Location, PlaybackState};
pub use utils::now_millis;
