//! Graceful shutdown coordination
//!
//! A single [`ShutdownCoordinator`] is shared by every long-running loop. Loops
//! hold a [`ShutdownListener`] and a [`TaskGuard`]; `shutdown()` raises the
//! graceful signal, waits for the guards to drop, and escalates to a forced
//! signal once the graceful timeout has passed.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// What a listener is asked to do, in order of urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Stop taking new work, let in-flight requests finish
    Graceful,
    /// Drop everything now
    Forced,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownSignal::Graceful => write!(f, "graceful"),
            ShutdownSignal::Forced => write!(f, "forced"),
        }
    }
}

/// Shared shutdown state for every server and dispatch task
pub struct ShutdownCoordinator {
    sender: watch::Sender<Option<ShutdownSignal>>,
    is_shutting_down: AtomicBool,
    active_tasks: Arc<AtomicUsize>,
    graceful_timeout: Duration,
    forced_grace: Duration,
}

impl ShutdownCoordinator {
    /// 30 s to drain, then 500 ms after the forced signal
    pub fn new() -> Self {
        Self::with_timeouts(Duration::from_secs(30), Duration::from_millis(500))
    }

    /// Coordinator with explicit drain limits.
    ///
    /// `forced_grace` is how long tasks get to react to the forced signal
    /// before `shutdown()` gives up on them.
    pub fn with_timeouts(graceful_timeout: Duration, forced_grace: Duration) -> Self {
        let (sender, _) = watch::channel(None);

        Self {
            sender,
            is_shutting_down: AtomicBool::new(false),
            active_tasks: Arc::new(AtomicUsize::new(0)),
            graceful_timeout,
            forced_grace,
        }
    }

    /// New listener; sees a request made before it subscribed
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.is_shutting_down.load(Ordering::SeqCst)
    }

    /// Register a running task; it counts as active until the guard drops
    pub fn track(&self) -> TaskGuard {
        self.active_tasks.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            active_tasks: Arc::clone(&self.active_tasks),
        }
    }

    pub fn active_task_count(&self) -> usize {
        self.active_tasks.load(Ordering::SeqCst)
    }

    /// Raise the graceful signal without waiting for tasks to drain
    pub fn trigger(&self) -> Result<(), ShutdownError> {
        self.begin()?;
        self.sender.send_replace(Some(ShutdownSignal::Graceful));
        Ok(())
    }

    /// Raise the graceful signal and wait for tracked tasks to finish.
    /// Escalates to forced once `graceful_timeout` has passed.
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        self.begin()?;

        info!(active_tasks = self.active_task_count(), "Shutdown requested");
        self.sender.send_replace(Some(ShutdownSignal::Graceful));

        if self.wait_for_tasks(self.graceful_timeout).await {
            info!("All tasks drained");
            return Ok(());
        }

        error!(
            active_tasks = self.active_task_count(),
            "Tasks still running after {:?}, sending forced signal",
            self.graceful_timeout
        );
        self.sender.send_replace(Some(ShutdownSignal::Forced));

        if self.wait_for_tasks(self.forced_grace).await {
            info!("All tasks drained after forced signal");
            return Ok(());
        }

        let stuck = self.active_task_count();
        warn!(stuck, "Giving up on tasks that ignored the forced signal");
        Err(ShutdownError::TasksRemaining(stuck))
    }

    /// Only the first caller gets to shut down
    fn begin(&self) -> Result<(), ShutdownError> {
        self.is_shutting_down
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| ShutdownError::AlreadyShuttingDown)
    }

    async fn wait_for_tasks(&self, limit: Duration) -> bool {
        let start = tokio::time::Instant::now();

        loop {
            let active = self.active_task_count();
            if active == 0 {
                return true;
            }
            if start.elapsed() >= limit {
                return false;
            }

            let poll = if active > 10 { 100 } else { 20 };
            tokio::time::sleep(Duration::from_millis(poll)).await;
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of the shutdown signal
#[derive(Clone)]
pub struct ShutdownListener {
    receiver: watch::Receiver<Option<ShutdownSignal>>,
}

impl ShutdownListener {
    /// Wait until shutdown has been requested.
    ///
    /// Resolves immediately when the request came before this call. A dropped
    /// coordinator can no longer signal anything and is reported as forced.
    pub async fn recv(&mut self) -> ShutdownSignal {
        match self.receiver.wait_for(Option::is_some).await {
            Ok(signal) => (*signal).unwrap_or(ShutdownSignal::Forced),
            Err(_) => ShutdownSignal::Forced,
        }
    }

    /// The latest signal, if any
    pub fn signal(&self) -> Option<ShutdownSignal> {
        *self.receiver.borrow()
    }

    pub fn is_shutdown(&self) -> bool {
        self.signal().is_some()
    }
}

/// Keeps a task counted as active by its [`ShutdownCoordinator`]
#[derive(Debug)]
pub struct TaskGuard {
    active_tasks: Arc<AtomicUsize>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.active_tasks.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("Shutdown already requested")]
    AlreadyShuttingDown,

    #[error("{0} tasks still running after the forced signal")]
    TasksRemaining(usize),
}
