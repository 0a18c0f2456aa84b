use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use super::shared::AdapterCore;
use super::{DeviceAdapter, RateControl};
use crate::context::CastContext;
use crate::devices::{AirPlayDevice, AirPlayPlaybackInfo, DeviceSummary};
use crate::error::DeviceResult;
use crate::protocol_constants::{AIRPLAY_PLAY_ACCEPTED, AIRPLAY_RATE_PAUSED, AIRPLAY_RATE_PLAYING};
use crate::state::{Backend, StatusSnapshot};
use crate::utils::linear_to_airplay_units;

/// Adapter over an AirPlay device library.
///
/// AirPlay receivers have no pause command and never report their volume:
/// play/pause go through the playback rate, and the commanded volume is
/// written into the playback state as soon as it is sent.
pub struct AirPlayAdapter {
    core: Arc<AdapterCore<dyn AirPlayDevice>>,
}

impl AirPlayAdapter {
    pub fn new(ctx: Arc<CastContext>) -> Self {
        Self {
            core: AdapterCore::new(Backend::Airplay, ctx),
        }
    }

    /// Registers a receiver announced by discovery.
    pub fn add_device(&self, device: Arc<dyn AirPlayDevice>) {
        self.core.add_device(device);
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.core.device_count()
    }
}

fn to_snapshot(info: &AirPlayPlaybackInfo) -> StatusSnapshot {
    StatusSnapshot {
        current_time: info.position,
        is_paused: info.rate == AIRPLAY_RATE_PAUSED,
        volume: None,
    }
}

#[async_trait]
impl DeviceAdapter for AirPlayAdapter {
    fn backend(&self) -> Backend {
        Backend::Airplay
    }

    fn devices(&self) -> Vec<DeviceSummary> {
        self.core.summaries()
    }

    fn select_device(&self, index: usize, session: Uuid) -> bool {
        self.core.select(index, session)
    }

    fn detach(&self, session: Uuid) -> Option<BoxFuture<'static, DeviceResult<()>>> {
        let device = self.core.take(session)?;
        Some(async move { device.stop().await }.boxed())
    }

    async fn open(&self) {
        let Some((device, session)) = self.core.current() else {
            self.core.no_active_device("open");
            return;
        };

        let outcome = match self.core.ctx().media_request() {
            Some(media) => match device.play(&media.url, 0.0).await {
                Ok(AIRPLAY_PLAY_ACCEPTED) => Ok(()),
                Ok(status) => {
                    log::warn!("[AirPlay] Receiver answered play with status {}", status);
                    Err(format!("Could not connect to {}.", Backend::Airplay.display_name()))
                }
                Err(e) => Err(self.core.connect_failure(e)),
            },
            None => Err(self.core.connect_failure("Media server address unknown")),
        };
        self.core.finish_open(session, outcome);
    }

    async fn play(&self) -> DeviceResult<()> {
        self.rate(AIRPLAY_RATE_PLAYING).await
    }

    async fn pause(&self) -> DeviceResult<()> {
        self.rate(AIRPLAY_RATE_PAUSED).await
    }

    async fn stop(&self) -> DeviceResult<()> {
        match self.core.current() {
            Some((device, _)) => device.stop().await,
            None => {
                self.core.no_active_device("stop");
                Ok(())
            }
        }
    }

    async fn seek(&self, time: f64) -> DeviceResult<()> {
        match self.core.current() {
            Some((device, _)) => device.scrub(time).await,
            None => {
                self.core.no_active_device("seek");
                Ok(())
            }
        }
    }

    async fn volume(&self, level: f64) -> DeviceResult<()> {
        let Some((device, session)) = self.core.current() else {
            self.core.no_active_device("volume");
            return Ok(());
        };
        self.core.ctx().apply_volume(Backend::Airplay, session, level);
        device.volume(linear_to_airplay_units(level)).await
    }

    async fn status(&self) {
        let Some((device, session)) = self.core.current() else {
            return;
        };
        match device.status().await {
            Ok(info) => {
                self.core
                    .ctx()
                    .apply_status(Backend::Airplay, session, to_snapshot(&info));
            }
            Err(e) => log::warn!("[AirPlay] Playback info request failed: {}", e),
        }
    }

    fn rate_control(&self) -> RateControl {
        RateControl::Variable
    }

    async fn rate(&self, rate: f64) -> DeviceResult<()> {
        match self.core.current() {
            Some((device, _)) => device.rate(rate).await,
            None => {
                self.core.no_active_device("rate");
                Ok(())
            }
        }
    }
}
