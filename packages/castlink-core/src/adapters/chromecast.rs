use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use super::shared::AdapterCore;
use super::{DeviceAdapter, RateControl};
use crate::context::CastContext;
use crate::devices::{ChromecastDevice, ChromecastStatus, DeviceSummary, PlayerState};
use crate::error::DeviceResult;
use crate::state::{Backend, StatusSnapshot};

/// Adapter over a Chromecast device library.
pub struct ChromecastAdapter {
    core: Arc<AdapterCore<dyn ChromecastDevice>>,
}

impl ChromecastAdapter {
    pub fn new(ctx: Arc<CastContext>) -> Self {
        Self {
            core: AdapterCore::new(Backend::Chromecast, ctx),
        }
    }

    /// Registers a receiver announced by discovery.
    pub fn add_device(&self, device: Arc<dyn ChromecastDevice>) {
        self.core.add_device(device);
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.core.device_count()
    }
}

/// Maps a receiver media status into the shared playback fields.
fn to_snapshot(status: &ChromecastStatus) -> StatusSnapshot {
    StatusSnapshot {
        current_time: status.current_time,
        is_paused: status.player_state == PlayerState::Paused,
        volume: Some(if status.volume.muted {
            0.0
        } else {
            status.volume.level
        }),
    }
}

#[async_trait]
impl DeviceAdapter for ChromecastAdapter {
    fn backend(&self) -> Backend {
        Backend::Chromecast
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
            Some(media) => {
                log::info!("[Chromecast] Loading '{}' from {}", media.title, media.url);
                device
                    .load(&media)
                    .await
                    .map_err(|e| self.core.connect_failure(e))
            }
            None => Err(self.core.connect_failure("Media server address unknown")),
        };
        self.core.finish_open(session, outcome);
    }

    async fn play(&self) -> DeviceResult<()> {
        match self.core.current() {
            Some((device, _)) => device.play().await,
            None => {
                self.core.no_active_device("play");
                Ok(())
            }
        }
    }

    async fn pause(&self) -> DeviceResult<()> {
        match self.core.current() {
            Some((device, _)) => device.pause().await,
            None => {
                self.core.no_active_device("pause");
                Ok(())
            }
        }
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
            Some((device, _)) => device.seek(time).await,
            None => {
                self.core.no_active_device("seek");
                Ok(())
            }
        }
    }

    async fn volume(&self, level: f64) -> DeviceResult<()> {
        match self.core.current() {
            Some((device, _)) => device.set_volume(level).await,
            None => {
                self.core.no_active_device("volume");
                Ok(())
            }
        }
    }

    async fn status(&self) {
        let Some((device, session)) = self.core.current() else {
            return;
        };
        match device.status().await {
            Ok(status) => {
                self.core
                    .ctx()
                    .apply_status(Backend::Chromecast, session, to_snapshot(&status));
            }
            Err(e) => log::warn!("[Chromecast] Status request failed: {}", e),
        }
    }

    /// Receivers keep playing at normal speed; the request is only acknowledged.
    fn rate_control(&self) -> RateControl {
        RateControl::Acknowledged
    }
}
