//! State shared by every adapter: the backend's device registry, the active
//! device slot, and the observers that watch device event streams.

use std::fmt::Display;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::context::CastContext;
use crate::devices::{Device, DeviceEvent, DeviceSummary};
use crate::events::DiscoveryEvent;
use crate::registry::DeviceRegistry;
use crate::runtime::TaskSpawner;
use crate::state::Backend;
use crate::utils::now_millis;

/// The device bound for control, tagged with the connection it belongs to.
struct ActiveDevice<D: ?Sized> {
    device: Arc<D>,
    session: Uuid,
}

pub(crate) struct AdapterCore<D: ?Sized> {
    backend: Backend,
    ctx: Arc<CastContext>,
    registry: DeviceRegistry<D>,
    active: RwLock<Option<ActiveDevice<D>>>,
}

impl<D: Device + ?Sized + 'static> AdapterCore<D> {
    pub(crate) fn new(backend: Backend, ctx: Arc<CastContext>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            ctx,
            registry: DeviceRegistry::default(),
            active: RwLock::new(None),
        })
    }

    pub(crate) fn backend(&self) -> Backend {
        self.backend
    }

    pub(crate) fn ctx(&self) -> &Arc<CastContext> {
        &self.ctx
    }

    pub(crate) fn summaries(&self) -> Vec<DeviceSummary> {
        self.registry.summaries()
    }

    pub(crate) fn device_count(&self) -> usize {
        self.registry.len()
    }

    /// Registers a discovered device and starts watching its event stream.
    pub(crate) fn add_device(self: &Arc<Self>, device: Arc<D>) {
        let name = device.name();
        let count = self.registry.add(Arc::clone(&device));
        log::info!(
            "[{}] Discovered device '{}' ({} known)",
            self.backend.display_name(),
            name,
            count
        );
        self.ctx
            .emitter()
            .emit_discovery(DiscoveryEvent::DeviceFound {
                backend: self.backend,
                name,
                device_count: count,
                timestamp: now_millis(),
            });

        match device.subscribe() {
            Some(events) => self.watch(device, events),
            None => log::debug!(
                "[{}] Device exposes no event stream; failures surface through commands only",
                self.backend.display_name()
            ),
        }
    }

    fn watch(self: &Arc<Self>, device: Arc<D>, mut events: broadcast::Receiver<DeviceEvent>) {
        let core = Arc::clone(self);
        let token = self.ctx.shutdown_token().clone();
        self.ctx.spawner().spawn_cancellable(token, async move {
            loop {
                match events.recv().await {
                    Ok(event) => core.handle_device_event(&device, event),
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!(
                            "[{}] Device event stream lagged, {} events skipped",
                            core.backend.display_name(),
                            skipped
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    /// Demotes playback when the active device reports a failure. Events from
    /// any other device are ignored.
    fn handle_device_event(&self, device: &Arc<D>, event: DeviceEvent) {
        let Some(session) = self.session_of(device) else {
            log::debug!(
                "[{}] Ignoring {:?} from inactive device '{}'",
                self.backend.display_name(),
                event,
                device.name()
            );
            return;
        };

        let failure = match event {
            DeviceEvent::Error(message) => Some(self.connect_failure(message)),
            DeviceEvent::Disconnect => None,
        };
        self.fail(session, failure);
    }

    fn session_of(&self, device: &Arc<D>) -> Option<Uuid> {
        self.active
            .read()
            .as_ref()
            .filter(|active| Arc::ptr_eq(&active.device, device))
            .map(|active| active.session)
    }

    /// The active device and the session it was selected for.
    pub(crate) fn current(&self) -> Option<(Arc<D>, Uuid)> {
        self.active
            .read()
            .as_ref()
            .map(|active| (Arc::clone(&active.device), active.session))
    }

    pub(crate) fn select(&self, index: usize, session: Uuid) -> bool {
        let Some(device) = self.registry.get(index) else {
            return false;
        };
        log::info!(
            "[{}] Selected device '{}'",
            self.backend.display_name(),
            device.name()
        );
        *self.active.write() = Some(ActiveDevice { device, session });
        true
    }

    /// Clears the slot if it still belongs to `session`, returning the device.
    pub(crate) fn take(&self, session: Uuid) -> Option<Arc<D>> {
        let mut active = self.active.write();
        if active.as_ref().is_some_and(|a| a.session == session) {
            active.take().map(|a| a.device)
        } else {
            None
        }
    }

    /// Releases the device and demotes playback to local.
    pub(crate) fn fail(&self, session: Uuid, failure: Option<String>) {
        self.take(session);
        self.ctx.demote_to_local(self.backend, session, failure);
    }

    /// Moves a pending connection to connected, or back to local with
    /// `failure` logged.
    pub(crate) fn finish_open(&self, session: Uuid, outcome: Result<(), String>) {
        match outcome {
            Ok(()) => {
                self.ctx.complete_open(self.backend, session);
            }
            Err(message) => self.fail(session, Some(message)),
        }
    }

    /// Error log message for a connection failure.
    pub(crate) fn connect_failure(&self, detail: impl Display) -> String {
        format!(
            "Could not connect to {}. {}",
            self.backend.display_name(),
            detail
        )
    }

    /// Logs that a command was dropped for lack of an active device.
    pub(crate) fn no_active_device(&self, command: &str) {
        log::debug!(
            "[{}] {} ignored: no active device",
            self.backend.display_name(),
            command
        );
    }
}
