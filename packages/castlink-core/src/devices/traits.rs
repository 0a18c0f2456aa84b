//! Trait abstractions for the backend device libraries.
//!
//! Each backend's discovery/control library is consumed through one of these
//! traits. Their signatures are deliberately asymmetric because the libraries
//! are: AirPlay pauses through the playback rate, seeks by "scrubbing" and
//! takes volume in device units, Chromecast and DLNA take absolute positions
//! and linear volume. The adapters in [`crate::adapters`] hide the
//! differences.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::types::{
    AirPlayPlaybackInfo, ChromecastStatus, DeviceEvent, DeviceSummary, DlnaStatus, MediaRequest,
};
use crate::error::DeviceResult;

/// Identity and event stream common to every discovered device.
pub trait Device: Send + Sync {
    /// Stable identifier assigned by the discovery library.
    fn id(&self) -> String;

    /// Display name shown in the device menu.
    fn name(&self) -> String;

    /// Subscribes to the device's `error`/`disconnect` notifications.
    ///
    /// Returns `None` when the library does not surface them.
    fn subscribe(&self) -> Option<broadcast::Receiver<DeviceEvent>> {
        None
    }

    /// Menu entry for this device.
    fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            id: self.id(),
            name: self.name(),
        }
    }
}

/// Control surface of a Chromecast receiver.
#[async_trait]
pub trait ChromecastDevice: Device {
    /// Loads and starts the given media.
    async fn load(&self, media: &MediaRequest) -> DeviceResult<()>;

    /// Resumes the loaded media.
    async fn play(&self) -> DeviceResult<()>;

    async fn pause(&self) -> DeviceResult<()>;

    async fn stop(&self) -> DeviceResult<()>;

    /// Seeks to an absolute position in seconds.
    async fn seek(&self, position: f64) -> DeviceResult<()>;

    /// Sets the receiver volume (`0.0..=1.0`).
    async fn set_volume(&self, level: f64) -> DeviceResult<()>;

    async fn status(&self) -> DeviceResult<ChromecastStatus>;
}

/// Control surface of an AirPlay receiver.
#[async_trait]
pub trait AirPlayDevice: Device {
    /// Starts playing `url` at `start_position` (fraction of the media).
    ///
    /// Returns the HTTP status code of the receiver's reply.
    async fn play(&self, url: &str, start_position: f64) -> DeviceResult<u16>;

    /// Sets the playback rate. `0.0` pauses, `1.0` plays.
    async fn rate(&self, rate: f64) -> DeviceResult<()>;

    async fn stop(&self) -> DeviceResult<()>;

    /// Moves the playhead to `position` seconds.
    async fn scrub(&self, position: f64) -> DeviceResult<()>;

    /// Sets the volume in device units (`-30.0..=0.0`).
    async fn volume(&self, units: f64) -> DeviceResult<()>;

    async fn status(&self) -> DeviceResult<AirPlayPlaybackInfo>;
}

/// Control surface of a DLNA media renderer.
#[async_trait]
pub trait DlnaDevice: Device {
    /// Loads the media and starts it at `seek` seconds.
    async fn load(&self, media: &MediaRequest, seek: f64) -> DeviceResult<()>;

    async fn play(&self) -> DeviceResult<()>;

    async fn pause(&self) -> DeviceResult<()>;

    async fn stop(&self) -> DeviceResult<()>;

    /// Seeks to an absolute position in seconds.
    async fn seek(&self, position: f64) -> DeviceResult<()>;

    /// Sets the renderer volume (`0.0..=1.0`).
    async fn set_volume(&self, level: f64) -> DeviceResult<()>;

    async fn status(&self) -> DeviceResult<DlnaStatus>;
}
