//! Periodic status polling for the remote connection.
//!
//! While a connection is pending or established, a single background task
//! asks the connected adapter for its status once per interval and lets the
//! adapter republish it into the playback state. Each tick re-reads the
//! location, so a pending connection polls nothing and a tick racing a
//! demotion resolves no adapter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::adapters::AdapterSet;
use crate::context::CastContext;
use crate::runtime::{TaskSpawner, TokioSpawner};

/// Counts live poll tasks for as long as it is held.
struct RunningGuard(Arc<AtomicUsize>);

impl RunningGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owner of the (at most one) status poll task.
pub struct StatusPoller {
    interval: Duration,
    spawner: TokioSpawner,
    current: Mutex<Option<CancellationToken>>,
    running: Arc<AtomicUsize>,
}

impl StatusPoller {
    pub fn new(interval: Duration, spawner: TokioSpawner) -> Self {
        Self {
            interval,
            spawner,
            current: Mutex::new(None),
            running: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts polling under `parent`, cancelling any poller already running.
    ///
    /// The first tick fires one interval after the call.
    pub(crate) fn start(
        &self,
        ctx: Arc<CastContext>,
        adapters: Arc<AdapterSet>,
        parent: &CancellationToken,
    ) {
        let token = parent.child_token();
        if let Some(previous) = self.current.lock().replace(token.clone()) {
            log::debug!("[StatusPoller] Replacing running poller");
            previous.cancel();
        }

        let guard = RunningGuard::new(&self.running);
        let period = self.interval;
        log::info!("[StatusPoller] Polling every {:?}", period);

        self.spawner.spawn_cancellable(token, async move {
            let _guard = guard;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let location = ctx.location();
                match adapters.resolve(location) {
                    Some(adapter) => adapter.status().await,
                    None => log::trace!("[StatusPoller] Nothing to poll while {}", location),
                }
            }
        });
    }

    /// Cancels the running poller. Returns `false` if none was running.
    pub fn stop(&self) -> bool {
        match self.current.lock().take() {
            Some(token) => {
                token.cancel();
                log::info!("[StatusPoller] Stopped");
                true
            }
            None => false,
        }
    }

    /// Whether a poller has been started and not yet stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Number of poll tasks that have not yet exited. Cancelled tasks exit the
    /// next time the runtime polls them.
    #[must_use]
    pub fn running_instances(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DlnaStatus, PlayerState};
    use crate::state::{Backend, Location};
    use crate::test_support::{settle, test_context, MockDlna, RecordingEmitter};
    use crate::DeviceAdapter;
    use uuid::Uuid;

    fn playing(current_time: f64) -> DlnaStatus {
        DlnaStatus {
            player_state: PlayerState::Playing,
            current_time,
            volume_level: 0.6,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn restart_leaves_a_single_instance() {
        let ctx = test_context(Arc::new(RecordingEmitter::default()));
        let adapters = Arc::new(AdapterSet::new(&ctx));

        ctx.start_polling(adapters.clone());
        ctx.start_polling(adapters.clone());
        ctx.start_polling(adapters);
        settle().await;

        assert!(ctx.poller().is_running());
        assert_eq!(ctx.poller().running_instances(), 1);

        assert!(ctx.poller().stop());
        assert!(!ctx.poller().stop());
        settle().await;
        assert_eq!(ctx.poller().running_instances(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_apply_status_only_once_connected() {
        let ctx = test_context(Arc::new(RecordingEmitter::default()));
        let adapters = Arc::new(AdapterSet::new(&ctx));
        let tv = MockDlna::new("Bravia");
        adapters.dlna.add_device(tv.clone());

        let session = Uuid::new_v4();
        adapters.dlna.select_device(0, session);
        ctx.begin_connection(Backend::Dlna, session);
        ctx.start_polling(adapters.clone());

        // Pending: ticks resolve no adapter.
        tokio::time::sleep(Duration::from_millis(1_010)).await;
        assert!(tv.calls().is_empty());

        adapters.dlna.open().await;
        assert_eq!(ctx.location(), Location::Connected(Backend::Dlna));
        tv.push_status(Ok(playing(3.0)));
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        let state = ctx.snapshot();
        assert_eq!(state.current_time, 3.0);
        assert_eq!(state.volume, 0.6);
        assert_eq!(tv.calls().iter().filter(|c| *c == "status").count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn demotion_stops_the_poller() {
        let ctx = test_context(Arc::new(RecordingEmitter::default()));
        let adapters = Arc::new(AdapterSet::new(&ctx));
        let session = Uuid::new_v4();
        ctx.begin_connection(Backend::Chromecast, session);
        ctx.start_polling(adapters);
        settle().await;
        assert_eq!(ctx.poller().running_instances(), 1);

        ctx.demote_to_local(Backend::Chromecast, session, None);
        settle().await;

        assert!(!ctx.poller().is_running());
        assert_eq!(ctx.poller().running_instances(), 0);
    }
}
