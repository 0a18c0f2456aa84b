//! Shared cast context and the connection state machine transitions.
//!
//! [`CastContext`] owns the process-wide [`PlaybackState`], the error log and
//! the status poller, and is handed by `Arc` to every adapter. All writes to
//! the playback state go through the transition methods below. Each one takes
//! the state lock, re-checks the location and connection session it was issued
//! for, and only then mutates. A completion that arrives after playback has
//! moved on (closed, failed, or reconnected elsewhere) is dropped rather than
//! applied, so a late status reply can never resurrect a connection.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::adapters::AdapterSet;
use crate::config::CastConfig;
use crate::devices::MediaRequest;
use crate::events::{EventEmitter, PlaybackEvent};
use crate::media::{resolve_media_request, MediaLibrary};
use crate::runtime::TokioSpawner;
use crate::services::StatusPoller;
use crate::state::{Backend, ErrorEntry, ErrorLog, Location, PlaybackState, StatusSnapshot};
use crate::utils::now_millis;

/// Shared state and services for one cast control plane.
pub struct CastContext {
    config: CastConfig,
    state: RwLock<PlaybackState>,
    errors: ErrorLog,
    media: Arc<dyn MediaLibrary>,
    emitter: Arc<dyn EventEmitter>,
    spawner: TokioSpawner,
    poller: StatusPoller,
    /// Cancelled when the current connection ends; parents the open request
    /// and the status poller.
    connection: Mutex<Option<CancellationToken>>,
    shutdown: CancellationToken,
}

impl CastContext {
    /// Creates a context in the `local` location.
    pub fn new(
        config: CastConfig,
        media: Arc<dyn MediaLibrary>,
        emitter: Arc<dyn EventEmitter>,
        spawner: TokioSpawner,
    ) -> Arc<Self> {
        let poller = StatusPoller::new(config.status_poll_interval(), spawner.clone());
        Arc::new(Self {
            config,
            state: RwLock::new(PlaybackState::default()),
            errors: ErrorLog::default(),
            media,
            emitter,
            spawner,
            poller,
            connection: Mutex::new(None),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &CastConfig {
        &self.config
    }

    pub fn spawner(&self) -> &TokioSpawner {
        &self.spawner
    }

    pub fn emitter(&self) -> &Arc<dyn EventEmitter> {
        &self.emitter
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    /// Token cancelled by [`shutdown`](Self::shutdown); parents every background task.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Token scoped to the current connection, or the shutdown token while local.
    pub fn connection_token(&self) -> CancellationToken {
        self.connection
            .lock()
            .clone()
            .unwrap_or_else(|| self.shutdown.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn snapshot(&self) -> PlaybackState {
        self.state.read().clone()
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.state.read().location
    }

    #[must_use]
    pub fn errors(&self) -> Vec<ErrorEntry> {
        self.errors.snapshot()
    }

    /// Load request for the content currently in the playback state.
    #[must_use]
    pub fn media_request(&self) -> Option<MediaRequest> {
        let info_hash = self.state.read().info_hash.clone();
        resolve_media_request(
            self.media.as_ref(),
            &self.config.app_name,
            info_hash.as_deref(),
        )
    }

    /// Position a reconnecting DLNA renderer should start at.
    ///
    /// Short positions restart from the beginning.
    #[must_use]
    pub fn resume_offset(&self) -> f64 {
        let current_time = self.state.read().current_time;
        if current_time > self.config.resume_threshold_secs {
            current_time
        } else {
            0.0
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connection transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// `local → <backend>-pending`.
    ///
    /// Returns the token scoped to the new connection, or `None` if playback
    /// was not local.
    pub fn begin_connection(&self, backend: Backend, session: Uuid) -> Option<CancellationToken> {
        let snapshot = {
            let mut state = self.state.write();
            if !state.location.is_local() {
                return None;
            }
            state.location = Location::Pending(backend);
            state.session = Some(session);
            state.clone()
        };

        let token = self.shutdown.child_token();
        if let Some(previous) = self.connection.lock().replace(token.clone()) {
            previous.cancel();
        }

        log::info!("[Cast] Connecting to {} (session {})", backend, session);
        self.emit_state(snapshot);
        Some(token)
    }

    /// `<backend>-pending → <backend>` once the device accepted the media.
    pub fn complete_open(&self, backend: Backend, session: Uuid) -> bool {
        let snapshot = {
            let mut state = self.state.write();
            if state.location != Location::Pending(backend) || state.session != Some(session) {
                log::debug!(
                    "[Cast] Dropping stale {} open completion (now {})",
                    backend,
                    state.location
                );
                return false;
            }
            state.location = Location::Connected(backend);
            state.clone()
        };

        log::info!("[Cast] Connected to {}", backend);
        self.emit_state(snapshot);
        true
    }

    /// `<backend>-pending | <backend> → local`.
    ///
    /// Stops the poller, records where local playback should resume, and
    /// appends `failure` to the error log when given. Returns `false` without
    /// side effects if the session is no longer current.
    pub fn demote_to_local(
        &self,
        backend: Backend,
        session: Uuid,
        failure: Option<String>,
    ) -> bool {
        let snapshot = {
            let mut state = self.state.write();
            if state.location.backend() != Some(backend) || state.session != Some(session) {
                return false;
            }
            state.location = Location::Local;
            state.jump_to_time = Some(state.current_time);
            state.session = None;
            state.clone()
        };

        self.poller.stop();
        if let Some(token) = self.connection.lock().take() {
            token.cancel();
        }

        match failure {
            Some(message) => {
                log::warn!("[Cast] {} connection lost: {}", backend, message);
                self.record_error(message);
            }
            None => log::info!("[Cast] {} connection closed", backend),
        }

        self.emit_state(snapshot);
        true
    }

    /// Starts the status poller for the current connection, replacing any
    /// running instance.
    pub fn start_polling(self: &Arc<Self>, adapters: Arc<AdapterSet>) {
        let parent = self.connection_token();
        self.poller.start(Arc::clone(self), adapters, &parent);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status updates
    // ─────────────────────────────────────────────────────────────────────────

    /// Republishes a device status into the playback state.
    pub fn apply_status(&self, backend: Backend, session: Uuid, status: StatusSnapshot) -> bool {
        let snapshot = {
            let mut state = self.state.write();
            if state.location != Location::Connected(backend) || state.session != Some(session) {
                return false;
            }
            state.current_time = status.current_time;
            state.is_paused = status.is_paused;
            if let Some(volume) = status.volume {
                state.volume = volume;
            }
            state.clone()
        };

        self.emit_state(snapshot);
        true
    }

    /// Writes a commanded volume into the state for backends whose status
    /// cannot (or does not yet) reflect it.
    pub fn apply_volume(&self, backend: Backend, session: Uuid, level: f64) -> bool {
        let snapshot = {
            let mut state = self.state.write();
            if state.location.backend() != Some(backend) || state.session != Some(session) {
                return false;
            }
            state.volume = level;
            state.clone()
        };

        self.emit_state(snapshot);
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Local player
    // ─────────────────────────────────────────────────────────────────────────

    /// Sets the content identifier used to title remote media.
    pub fn set_info_hash(&self, info_hash: Option<String>) {
        let snapshot = {
            let mut state = self.state.write();
            state.info_hash = info_hash;
            state.clone()
        };
        self.emit_state(snapshot);
    }

    /// Reports the local player's position. Ignored unless playback is local,
    /// since remote positions come from the status poller.
    pub fn set_local_position(&self, current_time: f64, is_paused: bool) -> bool {
        let snapshot = {
            let mut state = self.state.write();
            if !state.location.is_local() {
                return false;
            }
            state.current_time = current_time;
            state.is_paused = is_paused;
            state.clone()
        };
        self.emit_state(snapshot);
        true
    }

    /// Consumes the resume position left by the last fallback to local.
    pub fn take_jump_to_time(&self) -> Option<f64> {
        self.state.write().jump_to_time.take()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────────

    fn record_error(&self, message: String) {
        let entry = self.errors.push(message);
        self.emitter.emit_playback(PlaybackEvent::ErrorRecorded { entry });
    }

    fn emit_state(&self, state: PlaybackState) {
        self.emitter.emit_playback(PlaybackEvent::StateChanged {
            state,
            timestamp: now_millis(),
        });
    }

    /// Stops the poller and every task spawned for this context.
    pub fn shutdown(&self) {
        self.poller.stop();
        self.shutdown.cancel();
    }
}
