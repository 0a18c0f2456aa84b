//! Device adapters: one implementation of [`DeviceAdapter`] per backend.
//!
//! # Module Structure
//!
//! - `shared` - Registry, active device slot and event observers shared by every adapter
//! - `chromecast` - [`ChromecastAdapter`]
//! - `airplay` - [`AirPlayAdapter`]
//! - `dlna` - [`DlnaAdapter`]
//!
//! The control plane only ever talks to `Arc<dyn DeviceAdapter>`, resolved
//! from the playback location through [`AdapterSet`].

mod airplay;
mod chromecast;
mod dlna;
mod shared;

pub use airplay::AirPlayAdapter;
pub use chromecast::ChromecastAdapter;
pub use dlna::DlnaAdapter;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::context::CastContext;
use crate::devices::DeviceSummary;
use crate::error::DeviceResult;
use crate::state::{Backend, Location};

/// How a backend handles variable playback rate requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateControl {
    /// The device changes its playback rate.
    Variable,
    /// The request is acknowledged but the device keeps playing at normal speed.
    Acknowledged,
    /// The backend takes no part in rate control.
    Unsupported,
}

/// Common control surface over one backend's device library.
///
/// Every command is a no-op returning `Ok(())` when no device is active.
#[async_trait]
pub trait DeviceAdapter: Send + Sync {
    fn backend(&self) -> Backend;

    /// Menu entries for every device discovered so far.
    fn devices(&self) -> Vec<DeviceSummary>;

    /// Binds the device at `index` to the active slot for `session`.
    ///
    /// Returns `false` if there is no device at `index`.
    fn select_device(&self, index: usize, session: Uuid) -> bool;

    /// Clears the active slot if it still belongs to `session` and returns a
    /// request that stops the released device.
    fn detach(&self, session: Uuid) -> Option<BoxFuture<'static, DeviceResult<()>>>;

    /// Asks the active device to start rendering the current media and moves
    /// the connection to connected or back to local accordingly.
    async fn open(&self);

    async fn play(&self) -> DeviceResult<()>;

    async fn pause(&self) -> DeviceResult<()>;

    async fn stop(&self) -> DeviceResult<()>;

    /// Moves the playhead to `time` seconds.
    async fn seek(&self, time: f64) -> DeviceResult<()>;

    /// Sets the volume from a linear `0.0..=1.0` level.
    async fn volume(&self, level: f64) -> DeviceResult<()>;

    /// Pulls position, pause state and (where available) volume from the
    /// device into the playback state. Errors are logged, never applied.
    async fn status(&self);

    fn rate_control(&self) -> RateControl {
        RateControl::Unsupported
    }

    /// Changes the playback rate. Only called when [`rate_control`](Self::rate_control)
    /// is [`RateControl::Variable`].
    async fn rate(&self, _rate: f64) -> DeviceResult<()> {
        Ok(())
    }
}

/// The three adapters of one control plane.
pub struct AdapterSet {
    pub chromecast: Arc<ChromecastAdapter>,
    pub airplay: Arc<AirPlayAdapter>,
    pub dlna: Arc<DlnaAdapter>,
}

impl AdapterSet {
    pub fn new(ctx: &Arc<CastContext>) -> Self {
        Self {
            chromecast: Arc::new(ChromecastAdapter::new(Arc::clone(ctx))),
            airplay: Arc::new(AirPlayAdapter::new(Arc::clone(ctx))),
            dlna: Arc::new(DlnaAdapter::new(Arc::clone(ctx))),
        }
    }

    /// Adapter for `backend`.
    #[must_use]
    pub fn get(&self, backend: Backend) -> Arc<dyn DeviceAdapter> {
        match backend {
            Backend::Chromecast => Arc::clone(&self.chromecast) as Arc<dyn DeviceAdapter>,
            Backend::Airplay => Arc::clone(&self.airplay) as Arc<dyn DeviceAdapter>,
            Backend::Dlna => Arc::clone(&self.dlna) as Arc<dyn DeviceAdapter>,
        }
    }

    /// Adapter for a connected location; `None` while local or pending.
    #[must_use]
    pub fn resolve(&self, location: Location) -> Option<Arc<dyn DeviceAdapter>> {
        location.connected_backend().map(|backend| self.get(backend))
    }
}
