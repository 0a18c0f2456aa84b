//! Task spawning abstraction.
//!
//! Device I/O never runs on the caller's stack: every connect, command and
//! status request is spawned through a [`TaskSpawner`] so the control API
//! stays synchronous for the UI layer. The embedding application decides which
//! runtime the tasks land on.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Abstraction for spawning background tasks.
///
/// # Example
///
/// ```ignore
/// struct Poller {
///     spawner: TokioSpawner,
/// }
///
/// impl Poller {
///     fn start(&self, token: CancellationToken) {
///         self.spawner.spawn_cancellable(token, async {
///             // tick loop
///         });
///     }
/// }
/// ```
pub trait TaskSpawner: Send + Sync {
    /// Spawns a future as a detached background task.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Spawns a future that is dropped as soon as `token` is cancelled.
    ///
    /// Dropping the future drops any in-flight device request it was awaiting,
    /// so its completion is never observed.
    fn spawn_cancellable<F>(&self, token: CancellationToken, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = future => {}
            }
        });
    }
}

/// Tokio-based spawner.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Creates a new `TokioSpawner` with the given runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Creates a new `TokioSpawner` using the current runtime's handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn tokio_spawner_executes_task() {
        let spawner = TokioSpawner::current();
        let executed = Arc::new(AtomicBool::new(false));
        let executed_clone = executed.clone();

        spawner.spawn(async move {
            executed_clone.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(executed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_completes() {
        let spawner = TokioSpawner::current();
        let token = CancellationToken::new();
        let completed = Arc::new(AtomicBool::new(false));
        let completed_clone = completed.clone();

        spawner.spawn_cancellable(token.clone(), async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            completed_clone.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(!completed.load(Ordering::SeqCst));
    }
}
