use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use super::shared::AdapterCore;
use super::DeviceAdapter;
use crate::context::CastContext;
use crate::devices::{DeviceSummary, DlnaDevice, DlnaStatus, PlayerState};
use crate::error::DeviceResult;
use crate::state::{Backend, StatusSnapshot};

/// Adapter over a DLNA media renderer library.
pub struct DlnaAdapter {
    core: Arc<AdapterCore<dyn DlnaDevice>>,
}

impl DlnaAdapter {
    pub fn new(ctx: Arc<CastContext>) -> Self {
        Self {
            core: AdapterCore::new(Backend::Dlna, ctx),
        }
    }

    /// Registers a renderer announced by discovery.
    pub fn add_device(&self, device: Arc<dyn DlnaDevice>) {
        self.core.add_device(device);
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.core.device_count()
    }
}

fn to_snapshot(status: &DlnaStatus) -> StatusSnapshot {
    StatusSnapshot {
        current_time: status.current_time,
        is_paused: status.player_state == PlayerState::Paused,
        volume: Some(status.volume_level),
    }
}

#[async_trait]
impl DeviceAdapter for DlnaAdapter {
    fn backend(&self) -> Backend {
        Backend::Dlna
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

    /// Loads the media at the resume offset so a renderer picks up where the
    /// previous player left off.
    async fn open(&self) {
        let Some((device, session)) = self.core.current() else {
            self.core.no_active_device("open");
            return;
        };

        let ctx = self.core.ctx();
        let outcome = match ctx.media_request() {
            Some(media) => {
                let offset = ctx.resume_offset();
                log::info!("[DLNA] Loading '{}' at {}s", media.title, offset);
                device
                    .load(&media, offset)
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

    /// Renderers are slow to report volume changes, so an acknowledged level
    /// is written into the playback state right away. The next status read
    /// overwrites it with the renderer's own value.
    async fn volume(&self, level: f64) -> DeviceResult<()> {
        let Some((device, session)) = self.core.current() else {
            self.core.no_active_device("volume");
            return Ok(());
        };
        device.set_volume(level).await?;
        self.core.ctx().apply_volume(Backend::Dlna, session, level);
        Ok(())
    }

    async fn status(&self) {
        let Some((device, session)) = self.core.current() else {
            return;
        };
        match device.status().await {
            Ok(status) => {
                self.core
                    .ctx()
                    .apply_status(Backend::Dlna, session, to_snapshot(&status));
            }
            Err(e) => log::warn!("[DLNA] Status request failed: {}", e),
        }
    }
}
