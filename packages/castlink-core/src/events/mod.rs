//! Event system for notifying the UI layer of state changes.
//!
//! This module provides:
//! - [`EventEmitter`] trait through which the control plane reports changes
//! - [`BroadcastEventBridge`] for fanning events out over a tokio broadcast channel
//! - Event types for playback and discovery

mod bridge;
mod emitter;

pub use bridge::BroadcastEventBridge;
pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};

use serde::Serialize;

use crate::state::{Backend, ErrorEntry, PlaybackState};

/// Events broadcast to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum BroadcastEvent {
    /// Playback location or status changed.
    Playback(PlaybackEvent),

    /// A discovery source announced a device.
    Discovery(DiscoveryEvent),
}

/// Events describing changes to the shared playback state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// The playback state was mutated. Carries the state after the mutation.
    StateChanged {
        state: PlaybackState,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// A connection failure was appended to the error log.
    ErrorRecorded { entry: ErrorEntry },
}

/// Events from device discovery.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiscoveryEvent {
    /// A device was added to a backend registry.
    DeviceFound {
        backend: Backend,
        /// Device display name.
        name: String,
        /// Number of devices now known for the backend.
        #[serde(rename = "deviceCount")]
        device_count: usize,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

impl From<PlaybackEvent> for BroadcastEvent {
    fn from(event: PlaybackEvent) -> Self {
        BroadcastEvent::Playback(event)
    }
}

impl From<DiscoveryEvent> for BroadcastEvent {
    fn from(event: DiscoveryEvent) -> Self {
        BroadcastEvent::Discovery(event)
    }
}
