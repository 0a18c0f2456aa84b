//! Event emitter abstraction for decoupling the control plane from its UI.
//!
//! Components depend on the [`EventEmitter`] trait rather than concrete
//! channels or callbacks. It is the "state changed" hook the UI layer passes
//! in at startup.

use super::{DiscoveryEvent, PlaybackEvent};

/// Trait for emitting domain events without knowledge of transport.
///
/// # Example
///
/// ```ignore
/// struct RenderLoop;
///
/// impl EventEmitter for RenderLoop {
///     fn emit_playback(&self, event: PlaybackEvent) {
///         // schedule a re-render
///     }
///     fn emit_discovery(&self, _event: DiscoveryEvent) {}
/// }
/// ```
pub trait EventEmitter: Send + Sync {
    /// Emits a playback state event. Called after every state mutation.
    fn emit_playback(&self, event: PlaybackEvent);

    /// Emits a device discovery event.
    fn emit_discovery(&self, event: DiscoveryEvent);
}

/// No-op emitter for headless use or testing.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_playback(&self, _event: PlaybackEvent) {}

    fn emit_discovery(&self, _event: DiscoveryEvent) {}
}

/// Logging emitter for debugging and development.
///
/// Logs all events at debug level.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_playback(&self, event: PlaybackEvent) {
        tracing::debug!(?event, "playback_event");
    }

    fn emit_discovery(&self, event: DiscoveryEvent) {
        tracing::debug!(?event, "discovery_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Backend, PlaybackState};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test emitter that counts events.
    struct CountingEventEmitter {
        playback_count: AtomicUsize,
        discovery_count: AtomicUsize,
    }

    impl EventEmitter for CountingEventEmitter {
        fn emit_playback(&self, _event: PlaybackEvent) {
            self.playback_count.fetch_add(1, Ordering::SeqCst);
        }

        fn emit_discovery(&self, _event: DiscoveryEvent) {
            self.discovery_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn counting_emitter_tracks_events() {
        let emitter = Arc::new(CountingEventEmitter {
            playback_count: AtomicUsize::new(0),
            discovery_count: AtomicUsize::new(0),
        });
        let as_dyn: Arc<dyn EventEmitter> = emitter.clone();

        as_dyn.emit_playback(PlaybackEvent::StateChanged {
            state: PlaybackState::default(),
            timestamp: 0,
        });
        as_dyn.emit_discovery(DiscoveryEvent::DeviceFound {
            backend: Backend::Dlna,
            name: "TV".into(),
            device_count: 1,
            timestamp: 0,
        });

        assert_eq!(emitter.playback_count.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.discovery_count.load(Ordering::SeqCst), 1);
    }
}
