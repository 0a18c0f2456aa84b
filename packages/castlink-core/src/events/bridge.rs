//! Bridge implementation that maps domain events to a broadcast channel.
//!
//! The [`BroadcastEventBridge`] lets any number of UI consumers subscribe to
//! control plane events, and optionally forwards them to one external emitter.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::emitter::EventEmitter;
use super::{BroadcastEvent, DiscoveryEvent, PlaybackEvent};

/// Bridges domain events to a `tokio::sync::broadcast` channel.
///
/// # Thread Safety
///
/// The bridge is `Send + Sync` and can be shared across async tasks.
/// The external emitter uses `RwLock` to allow setting it after construction.
#[derive(Clone)]
pub struct BroadcastEventBridge {
    tx: broadcast::Sender<BroadcastEvent>,
    /// Optional external emitter for platform-specific event delivery
    external_emitter: Arc<RwLock<Option<Arc<dyn EventEmitter>>>>,
}

impl BroadcastEventBridge {
    /// Creates a new bridge with the given channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 (see [`CastConfig::validate`](crate::config::CastConfig::validate)).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            external_emitter: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets an external emitter that receives every event before the broadcast.
    pub fn set_external_emitter(&self, emitter: Arc<dyn EventEmitter>) {
        *self.external_emitter.write() = Some(emitter);
    }

    /// Returns a new receiver for the broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.tx.subscribe()
    }
}

/// Generates an [`EventEmitter`] method that forwards to the external emitter
/// (if set) and then sends to the broadcast channel.
macro_rules! impl_emit {
    ($method:ident, $event_ty:ty, $variant:ident) => {
        fn $method(&self, event: $event_ty) {
            if let Some(ref emitter) = *self.external_emitter.read() {
                emitter.$method(event.clone());
            }
            if let Err(e) = self.tx.send(BroadcastEvent::$variant(event)) {
                log::trace!("[EventBridge] No broadcast receivers: {}", e);
            }
        }
    };
}

impl EventEmitter for BroadcastEventBridge {
    impl_emit!(emit_playback, PlaybackEvent, Playback);
    impl_emit!(emit_discovery, DiscoveryEvent, Discovery);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopEventEmitter;
    use crate::state::{Backend, PlaybackState};

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bridge = BroadcastEventBridge::new(8);
        bridge.set_external_emitter(Arc::new(NoopEventEmitter));
        let mut rx = bridge.subscribe();

        bridge.emit_discovery(DiscoveryEvent::DeviceFound {
            backend: Backend::Chromecast,
            name: "Kitchen".into(),
            device_count: 1,
            timestamp: 1,
        });
        bridge.emit_playback(PlaybackEvent::StateChanged {
            state: PlaybackState::default(),
            timestamp: 2,
        });

        assert!(matches!(
            rx.recv().await.unwrap(),
            BroadcastEvent::Discovery(DiscoveryEvent::DeviceFound { .. })
        ));
        let event = rx.recv().await.unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["category"], "playback");
        assert_eq!(json["type"], "stateChanged");
        assert_eq!(json["state"]["location"], "local");
    }

    #[test]
    fn emitting_without_subscribers_does_not_fail() {
        let bridge = BroadcastEventBridge::new(1);
        bridge.emit_playback(PlaybackEvent::StateChanged {
            state: PlaybackState::default(),
            timestamp: 0,
        });
    }
}
