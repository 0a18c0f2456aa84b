//! Scripted device doubles and a recording emitter shared by test modules.
//!
//! Each mock records the commands it receives as short strings
//! (`"seek:12"`, `"volume:-15"`) and answers status requests from a queue.
//! An empty status queue answers with a transport error, which the adapters
//! treat as "no state change".

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};

use crate::config::CastConfig;
use crate::context::CastContext;
use crate::devices::{
    AirPlayDevice, AirPlayPlaybackInfo, ChromecastDevice, ChromecastStatus, ChromecastVolume,
    Device, DeviceEvent, DlnaDevice, DlnaStatus, MediaRequest, PlayerState,
};
use crate::error::{DeviceError, DeviceResult};
use crate::events::{DiscoveryEvent, EventEmitter, PlaybackEvent};
use crate::media::StaticMediaLibrary;
use crate::runtime::TokioSpawner;
use crate::state::Location;

/// Lets spawned tasks run to completion without advancing past a poll tick.
///
/// Intended for `start_paused` runtimes, where the clock only moves once every
/// task is idle.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Emitter
// ─────────────────────────────────────────────────────────────────────────────

/// Emitter that keeps every event it receives.
#[derive(Default)]
pub struct RecordingEmitter {
    playback: Mutex<Vec<PlaybackEvent>>,
    discovery: Mutex<Vec<DiscoveryEvent>>,
}

impl RecordingEmitter {
    /// Locations carried by `StateChanged` events, in emission order.
    pub fn locations(&self) -> Vec<Location> {
        self.playback
            .lock()
            .iter()
            .filter_map(|event| match event {
                PlaybackEvent::StateChanged { state, .. } => Some(state.location),
                PlaybackEvent::ErrorRecorded { .. } => None,
            })
            .collect()
    }

    pub fn state_changes(&self) -> usize {
        self.locations().len()
    }

    pub fn errors_recorded(&self) -> usize {
        self.playback
            .lock()
            .iter()
            .filter(|event| matches!(event, PlaybackEvent::ErrorRecorded { .. }))
            .count()
    }

    pub fn discovered(&self) -> Vec<DiscoveryEvent> {
        self.discovery.lock().clone()
    }
}

impl EventEmitter for RecordingEmitter {
    fn emit_playback(&self, event: PlaybackEvent) {
        self.playback.lock().push(event);
    }

    fn emit_discovery(&self, event: DiscoveryEvent) {
        self.discovery.lock().push(event);
    }
}

/// Call log and event channel shared by all mocks.
struct MockCore {
    id: String,
    name: String,
    events: broadcast::Sender<DeviceEvent>,
    calls: Mutex<Vec<String>>,
    open_gate: Mutex<Option<oneshot::Receiver<DeviceResult<()>>>>,
    open_result: Mutex<DeviceResult<()>>,
}

impl MockCore {
    fn new(name: &str) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            id: format!("mock-{}", name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            events,
            calls: Mutex::new(Vec::new()),
            open_gate: Mutex::new(None),
            open_result: Mutex::new(Ok(())),
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    /// Resolves the connect request, waiting on the gate if one is installed.
    async fn open_outcome(&self) -> DeviceResult<()> {
        let gate = self.open_gate.lock().take();
        match gate {
            Some(rx) => rx.await.unwrap_or(Err(DeviceError::Closed)),
            None => self.open_result.lock().clone(),
        }
    }

    fn hold_open(&self) -> oneshot::Sender<DeviceResult<()>> {
        let (tx, rx) = oneshot::channel();
        *self.open_gate.lock() = Some(rx);
        tx
    }
}

macro_rules! mock_common {
    ($ty:ident) => {
        impl $ty {
            /// Commands received so far, oldest first.
            pub fn calls(&self) -> Vec<String> {
                self.core.calls.lock().clone()
            }

            /// Makes the next connect request fail with `err`.
            pub fn fail_open(&self, err: DeviceError) {
                *self.core.open_result.lock() = Err(err);
            }

            /// Parks the next connect request until the returned sender fires.
            pub fn hold_open(&self) -> oneshot::Sender<DeviceResult<()>> {
                self.core.hold_open()
            }

            /// Fires a device notification to all subscribers.
            pub fn emit(&self, event: DeviceEvent) {
                let _ = self.core.events.send(event);
            }
        }

        impl Device for $ty {
            fn id(&self) -> String {
                self.core.id.clone()
            }

            fn name(&self) -> String {
                self.core.name.clone()
            }

            fn subscribe(&self) -> Option<broadcast::Receiver<DeviceEvent>> {
                if self.silent {
                    None
                } else {
                    Some(self.core.events.subscribe())
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Chromecast
// ─────────────────────────────────────────────────────────────────────────────

pub struct MockChromecast {
    core: MockCore,
    silent: bool,
    statuses: Mutex<VecDeque<DeviceResult<ChromecastStatus>>>,
}

impl MockChromecast {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            core: MockCore::new(name),
            silent: false,
            statuses: Mutex::new(VecDeque::new()),
        })
    }

    pub fn push_status(&self, status: DeviceResult<ChromecastStatus>) {
        self.statuses.lock().push_back(status);
    }
}

mock_common!(MockChromecast);

#[async_trait]
impl ChromecastDevice for MockChromecast {
    async fn load(&self, media: &MediaRequest) -> DeviceResult<()> {
        self.core.record(format!(
            "load:{}|{}|{}",
            media.url, media.content_type, media.title
        ));
        self.core.open_outcome().await
    }

    async fn play(&self) -> DeviceResult<()> {
        self.core.record("play");
        Ok(())
    }

    async fn pause(&self) -> DeviceResult<()> {
        self.core.record("pause");
        Ok(())
    }

    async fn stop(&self) -> DeviceResult<()> {
        self.core.record("stop");
        Ok(())
    }

    async fn seek(&self, position: f64) -> DeviceResult<()> {
        self.core.record(format!("seek:{position}"));
        Ok(())
    }

    async fn set_volume(&self, level: f64) -> DeviceResult<()> {
        self.core.record(format!("volume:{level}"));
        Ok(())
    }

    async fn status(&self) -> DeviceResult<ChromecastStatus> {
        self.core.record("status");
        self.statuses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(DeviceError::Transport("no status scripted".into())))
    }
}

pub fn chromecast_status(
    current_time: f64,
    paused: bool,
    level: f64,
    muted: bool,
) -> ChromecastStatus {
    ChromecastStatus {
        player_state: if paused {
            PlayerState::Paused
        } else {
            PlayerState::Playing
        },
        current_time,
        volume: ChromecastVolume { level, muted },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AirPlay
// ─────────────────────────────────────────────────────────────────────────────

pub struct MockAirPlay {
    core: MockCore,
    silent: bool,
    play_status: Mutex<u16>,
    statuses: Mutex<VecDeque<DeviceResult<AirPlayPlaybackInfo>>>,
}

impl MockAirPlay {
    /// AirPlay libraries expose no device event stream.
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            core: MockCore::new(name),
            silent: true,
            play_status: Mutex::new(200),
            statuses: Mutex::new(VecDeque::new()),
        })
    }

    /// Status code the receiver answers `play` with.
    pub fn reply_to_play_with(&self, status: u16) {
        *self.play_status.lock() = status;
    }

    pub fn push_status(&self, status: DeviceResult<AirPlayPlaybackInfo>) {
        self.statuses.lock().push_back(status);
    }
}

mock_common!(MockAirPlay);

#[async_trait]
impl AirPlayDevice for MockAirPlay {
    async fn play(&self, url: &str, start_position: f64) -> DeviceResult<u16> {
        self.core.record(format!("play:{url}@{start_position}"));
        self.core.open_outcome().await?;
        Ok(*self.play_status.lock())
    }

    async fn rate(&self, rate: f64) -> DeviceResult<()> {
        self.core.record(format!("rate:{rate}"));
        Ok(())
    }

    async fn stop(&self) -> DeviceResult<()> {
        self.core.record("stop");
        Ok(())
    }

    async fn scrub(&self, position: f64) -> DeviceResult<()> {
        self.core.record(format!("scrub:{position}"));
        Ok(())
    }

    async fn volume(&self, units: f64) -> DeviceResult<()> {
        self.core.record(format!("volume:{units}"));
        Ok(())
    }

    async fn status(&self) -> DeviceResult<AirPlayPlaybackInfo> {
        self.core.record("status");
        self.statuses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(DeviceError::Transport("no status scripted".into())))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DLNA
// ─────────────────────────────────────────────────────────────────────────────

pub struct MockDlna {
    core: MockCore,
    silent: bool,
    statuses: Mutex<VecDeque<DeviceResult<DlnaStatus>>>,
}

impl MockDlna {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            core: MockCore::new(name),
            silent: false,
            statuses: Mutex::new(VecDeque::new()),
        })
    }

    pub fn push_status(&self, status: DeviceResult<DlnaStatus>) {
        self.statuses.lock().push_back(status);
    }
}

mock_common!(MockDlna);

#[async_trait]
impl DlnaDevice for MockDlna {
    async fn load(&self, media: &MediaRequest, seek: f64) -> DeviceResult<()> {
        self.core.record(format!("load:{}@{seek}", media.title));
        self.core.open_outcome().await
    }

    async fn play(&self) -> DeviceResult<()> {
        self.core.record("play");
        Ok(())
    }

    async fn pause(&self) -> DeviceResult<()> {
        self.core.record("pause");
        Ok(())
    }

    async fn stop(&self) -> DeviceResult<()> {
        self.core.record("stop");
        Ok(())
    }

    async fn seek(&self, position: f64) -> DeviceResult<()> {
        self.core.record(format!("seek:{position}"));
        Ok(())
    }

    async fn set_volume(&self, level: f64) -> DeviceResult<()> {
        self.core.record(format!("volume:{level}"));
        Ok(())
    }

    async fn status(&self) -> DeviceResult<DlnaStatus> {
        self.core.record("status");
        self.statuses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(DeviceError::Transport("no status scripted".into())))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

pub const MEDIA_URL: &str = "http://192.168.1.20:9000/0";

/// Context with default config, a media server at [`MEDIA_URL`] and the given emitter.
pub fn test_context(emitter: Arc<RecordingEmitter>) -> Arc<CastContext> {
    CastContext::new(
        CastConfig::default(),
        Arc::new(StaticMediaLibrary::new(MEDIA_URL)),
        emitter,
        TokioSpawner::current(),
    )
}
