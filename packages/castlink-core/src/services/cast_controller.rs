//! Public control API: device menu, connection lifecycle and the playback
//! facade.
//!
//! All methods are synchronous. Device I/O is spawned on the context's
//! runtime and its outcome lands in the playback state, which the embedding
//! application observes through its [`EventEmitter`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::adapters::{
    AdapterSet, AirPlayAdapter, ChromecastAdapter, DeviceAdapter, DlnaAdapter, RateControl,
};
use crate::config::CastConfig;
use crate::context::CastContext;
use crate::devices::DeviceSummary;
use crate::discovery::DiscoveryFeeds;
use crate::error::{CastError, CastResult, DeviceResult};
use crate::events::{BroadcastEventBridge, EventEmitter};
use crate::media::MediaLibrary;
use crate::runtime::{TaskSpawner, TokioSpawner};
use crate::state::{Backend, ErrorEntry, Location, PlaybackState};
use crate::utils::clamp_volume;

/// Device menu produced by [`CastController::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMenu {
    /// Backend the menu lists devices for.
    pub location: Backend,
    pub devices: Vec<DeviceSummary>,
}

/// Redirects playback between the local player and remote devices.
pub struct CastController {
    ctx: Arc<CastContext>,
    adapters: Arc<AdapterSet>,
    menu: Mutex<Option<CastMenu>>,
    initialized: AtomicBool,
}

impl CastController {
    /// Creates a controller in the `local` location.
    ///
    /// # Errors
    ///
    /// Returns [`CastError::Configuration`] if `config` does not validate.
    pub fn new(
        config: CastConfig,
        media: Arc<dyn MediaLibrary>,
        emitter: Arc<dyn EventEmitter>,
        spawner: TokioSpawner,
    ) -> CastResult<Self> {
        config.validate()?;
        let ctx = CastContext::new(config, media, emitter, spawner);
        let adapters = Arc::new(AdapterSet::new(&ctx));
        Ok(Self {
            ctx,
            adapters,
            menu: Mutex::new(None),
            initialized: AtomicBool::new(false),
        })
    }

    /// Creates a controller that publishes its events on a broadcast bridge
    /// sized from `config.event_channel_capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`CastError::Configuration`] if `config` does not validate.
    pub fn with_broadcast(
        config: CastConfig,
        media: Arc<dyn MediaLibrary>,
        spawner: TokioSpawner,
    ) -> CastResult<(Self, Arc<BroadcastEventBridge>)> {
        config.validate()?;
        let bridge = Arc::new(BroadcastEventBridge::new(config.event_channel_capacity));
        let controller = Self::new(config, media, bridge.clone(), spawner)?;
        Ok((controller, bridge))
    }

    /// Starts consuming the discovery feeds. Only the first call has any effect.
    pub fn init(&self, feeds: DiscoveryFeeds) -> bool {
        if self.initialized.swap(true, Ordering::SeqCst) {
            log::warn!("[Cast] Already initialized, ignoring discovery feeds");
            return false;
        }
        feeds.spawn_forwarders(
            self.ctx.spawner(),
            self.ctx.shutdown_token(),
            &self.adapters,
        );
        log::info!("[Cast] Listening for Chromecast, AirPlay and DLNA devices");
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connection lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Shows the device menu for `backend`.
    ///
    /// # Errors
    ///
    /// - [`CastError::AlreadyConnected`] unless playback is local.
    /// - [`CastError::NoDevices`] if no device of that kind has been found.
    pub fn open(&self, backend: Backend) -> CastResult<CastMenu> {
        let current = self.ctx.location();
        if !current.is_local() {
            return Err(CastError::AlreadyConnected {
                requested: backend,
                current,
            });
        }

        let devices = self.adapters.get(backend).devices();
        if devices.is_empty() {
            return Err(CastError::NoDevices(backend));
        }

        let menu = CastMenu {
            location: backend,
            devices,
        };
        log::debug!(
            "[Cast] Showing {} menu with {} devices",
            backend,
            menu.devices.len()
        );
        *self.menu.lock() = Some(menu.clone());
        Ok(menu)
    }

    /// The menu currently shown, if any.
    #[must_use]
    pub fn menu(&self) -> Option<CastMenu> {
        self.menu.lock().clone()
    }

    /// Connects to the menu entry at `index`. The menu is consumed either way.
    ///
    /// Playback moves to `<backend>-pending` immediately; the device's answer
    /// to the load request later moves it to `<backend>` or back to `local`.
    ///
    /// # Errors
    ///
    /// - [`CastError::NoMenu`] without a preceding successful [`open`](Self::open).
    /// - [`CastError::InvalidSelection`] if `index` is outside the menu.
    /// - [`CastError::AlreadyConnected`] if a connection started since the menu was shown.
    pub fn select_device(&self, index: usize) -> CastResult<()> {
        let menu = self.menu.lock().take().ok_or(CastError::NoMenu)?;
        if index >= menu.devices.len() {
            return Err(CastError::InvalidSelection {
                index,
                available: menu.devices.len(),
            });
        }

        let backend = menu.location;
        let session = Uuid::new_v4();
        let token = self
            .ctx
            .begin_connection(backend, session)
            .ok_or_else(|| CastError::AlreadyConnected {
                requested: backend,
                current: self.ctx.location(),
            })?;

        let adapter = self.adapters.get(backend);
        if !adapter.select_device(index, session) {
            self.ctx.demote_to_local(backend, session, None);
            return Err(CastError::InvalidSelection {
                index,
                available: adapter.devices().len(),
            });
        }

        self.ctx.start_polling(Arc::clone(&self.adapters));
        self.ctx.spawner().spawn_cancellable(token, async move {
            adapter.open().await;
        });
        Ok(())
    }

    /// Returns playback to the local player.
    ///
    /// A connected device is told to stop; a pending load is abandoned.
    /// No-op while local.
    pub fn close(&self) {
        let state = self.ctx.snapshot();
        let (Some(backend), Some(session)) = (state.location.backend(), state.session) else {
            log::debug!("[Cast] Close ignored while {}", state.location);
            return;
        };

        let stop = self.adapters.get(backend).detach(session);
        if !self.ctx.demote_to_local(backend, session, None) {
            return;
        }

        if let (Location::Connected(_), Some(stop)) = (state.location, stop) {
            self.spawn_command(state.location, "stop", stop, self.ctx.shutdown_token().clone());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Playback facade
    // ─────────────────────────────────────────────────────────────────────────

    pub fn play(&self) {
        self.dispatch("play", |adapter| async move { adapter.play().await }.boxed());
    }

    pub fn pause(&self) {
        self.dispatch("pause", |adapter| async move { adapter.pause().await }.boxed());
    }

    /// Seeks to `time` seconds.
    pub fn seek(&self, time: f64) {
        self.dispatch("seek", move |adapter| {
            async move { adapter.seek(time).await }.boxed()
        });
    }

    /// Sets the volume, clamped to `0.0..=1.0`.
    pub fn set_volume(&self, level: f64) {
        let level = clamp_volume(level);
        self.dispatch("setVolume", move |adapter| {
            async move { adapter.volume(level).await }.boxed()
        });
    }

    /// Changes the playback rate. Returns `true` only if the connected device
    /// changes its rate.
    pub fn set_rate(&self, rate: f64) -> bool {
        let location = self.ctx.location();
        let Some(adapter) = self.adapters.resolve(location) else {
            return false;
        };

        match adapter.rate_control() {
            RateControl::Variable => {
                let command = async move { adapter.rate(rate).await }.boxed();
                self.spawn_command(location, "setRate", command, self.ctx.connection_token());
                true
            }
            RateControl::Acknowledged => {
                log::debug!("[Cast] {} setRate callback: playing at normal speed", location);
                false
            }
            RateControl::Unsupported => false,
        }
    }

    /// Sends a command to the connected adapter. No-op while local or pending.
    fn dispatch<F>(&self, op: &'static str, command: F)
    where
        F: FnOnce(Arc<dyn DeviceAdapter>) -> BoxFuture<'static, DeviceResult<()>>,
    {
        let location = self.ctx.location();
        match self.adapters.resolve(location) {
            Some(adapter) => {
                self.spawn_command(location, op, command(adapter), self.ctx.connection_token());
            }
            None => log::debug!("[Cast] {} ignored while {}", op, location),
        }
    }

    fn spawn_command(
        &self,
        location: Location,
        op: &'static str,
        command: BoxFuture<'static, DeviceResult<()>>,
        token: CancellationToken,
    ) {
        self.ctx.spawner().spawn_cancellable(token, async move {
            match command.await {
                Ok(()) => log::debug!("[Cast] {} {} callback: ok", location, op),
                Err(e) => log::warn!("[Cast] {} {} callback: {}", location, op, e),
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.ctx.snapshot()
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.ctx.location()
    }

    /// Every failure recorded so far, oldest first.
    #[must_use]
    pub fn errors(&self) -> Vec<ErrorEntry> {
        self.ctx.errors()
    }

    /// Position the local player should resume at after a fallback, consumed
    /// on read.
    pub fn take_jump_to_time(&self) -> Option<f64> {
        self.ctx.take_jump_to_time()
    }

    pub fn set_info_hash(&self, info_hash: Option<String>) {
        self.ctx.set_info_hash(info_hash);
    }

    /// Reports the local player's position; ignored while remote.
    pub fn set_local_position(&self, current_time: f64, is_paused: bool) -> bool {
        self.ctx.set_local_position(current_time, is_paused)
    }

    pub fn context(&self) -> &Arc<CastContext> {
        &self.ctx
    }

    pub fn chromecast(&self) -> &Arc<ChromecastAdapter> {
        &self.adapters.chromecast
    }

    pub fn airplay(&self) -> &Arc<AirPlayAdapter> {
        &self.adapters.airplay
    }

    pub fn dlna(&self) -> &Arc<DlnaAdapter> {
        &self.adapters.dlna
    }

    /// Stops polling and every background task. The controller is unusable
    /// afterwards.
    pub fn shutdown(&self) {
        log::info!("[Cast] Shutting down");
        self.menu.lock().take();
        self.ctx.shutdown();
    }
}
