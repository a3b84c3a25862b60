//! Shutdown coordination for graceful termination

use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use seekhash_config::LogType;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::error::panic_message;

pub const FORCED_EXIT_CODE: i32 = 1;

/// Hook for subsystems that must release resources on shutdown.
///
/// Both hooks default to doing nothing. A failing hook is logged and skipped,
/// it never stops the other listeners from being notified.
#[async_trait]
pub trait ShutdownListener: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn on_shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_force_shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The component whose teardown the graceful pass drives.
#[async_trait]
pub trait ShutdownTarget: Send + Sync {
    fn is_running(&self) -> bool;
    async fn shutdown(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShutdownState {
    NotShuttingDown = 0,
    ShuttingDown = 1,
    Completed = 2,
    Forced = 3,
}

impl ShutdownState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ShutdownState::NotShuttingDown,
            1 => ShutdownState::ShuttingDown,
            2 => ShutdownState::Completed,
            _ => ShutdownState::Forced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The completion signal arrived within the timeout.
    Completed,
    /// The timeout elapsed first. The process keeps running; escalating to
    /// [`ShutdownOrchestrator::force_shutdown`] is up to the caller.
    TimedOut,
    /// Another call already claimed the shutdown.
    AlreadyInProgress,
    /// The graceful pass itself panicked or was cancelled.
    Failed,
}

impl ShutdownOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            ShutdownOutcome::Completed
            | ShutdownOutcome::TimedOut
            | ShutdownOutcome::AlreadyInProgress => 0,
            ShutdownOutcome::Failed => FORCED_EXIT_CODE,
        }
    }
}

/// Resolves once the graceful pass started by
/// [`ShutdownOrchestrator::initiate_shutdown`] has finished.
#[derive(Debug)]
pub struct ShutdownCompletion {
    inner: CompletionInner,
}

#[derive(Debug)]
enum CompletionInner {
    Resolved(ShutdownOutcome),
    Pending(JoinHandle<ShutdownOutcome>),
}

impl ShutdownCompletion {
    fn resolved(outcome: ShutdownOutcome) -> Self {
        Self {
            inner: CompletionInner::Resolved(outcome),
        }
    }

    pub fn is_resolved(&self) -> bool {
        match &self.inner {
            CompletionInner::Resolved(_) => true,
            CompletionInner::Pending(handle) => handle.is_finished(),
        }
    }
}

impl Future for ShutdownCompletion {
    type Output = ShutdownOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.inner {
            CompletionInner::Resolved(outcome) => Poll::Ready(*outcome),
            CompletionInner::Pending(handle) => Pin::new(handle).poll(cx).map(|joined| {
                joined.unwrap_or_else(|e| {
                    error!(
                        log_type = LogType::Shutdown.as_str(),
                        "Graceful shutdown task failed: {}", e
                    );
                    ShutdownOutcome::Failed
                })
            }),
        }
    }
}

pub struct ShutdownOrchestrator {
    listeners: RwLock<Vec<Arc<dyn ShutdownListener>>>,
    state: AtomicU8,
    target: RwLock<Option<Weak<dyn ShutdownTarget>>>,
    timeout: Duration,
    completion: watch::Sender<bool>,
    finished: watch::Sender<bool>,
    outcome: Mutex<Option<ShutdownOutcome>>,
}

impl ShutdownOrchestrator {
    pub fn new(timeout: Duration) -> Arc<Self> {
        let (completion, _) = watch::channel(false);
        let (finished, _) = watch::channel(false);
        Arc::new(Self {
            listeners: RwLock::new(Vec::new()),
            state: AtomicU8::new(ShutdownState::NotShuttingDown as u8),
            target: RwLock::new(None),
            timeout,
            completion,
            finished,
            outcome: Mutex::new(None),
        })
    }

    /// Sets the component shut down by the graceful pass when it is still
    /// running. Only a weak reference is kept.
    pub fn attach(&self, target: Weak<dyn ShutdownTarget>) {
        *self.target.write() = Some(target);
    }

    pub fn register_listener(&self, listener: Arc<dyn ShutdownListener>) {
        debug!(
            log_type = LogType::Shutdown.as_str(),
            "Added shutdown listener: {}",
            listener.name()
        );
        self.listeners.write().push(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ShutdownListener>) {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|registered| !Arc::ptr_eq(registered, listener));
        if listeners.len() != before {
            debug!(
                log_type = LogType::Shutdown.as_str(),
                "Removed shutdown listener: {}",
                listener.name()
            );
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> ShutdownState {
        ShutdownState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_shutting_down(&self) -> bool {
        self.state() != ShutdownState::NotShuttingDown
    }

    /// Outcome of the graceful pass, once it has finished.
    pub fn last_outcome(&self) -> Option<ShutdownOutcome> {
        *self.outcome.lock()
    }

    /// Claims the one-time transition into `ShuttingDown` and runs the
    /// graceful pass on a spawned task.
    ///
    /// Every call after the first returns an already resolved completion with
    /// [`ShutdownOutcome::AlreadyInProgress`] and does nothing else. Must be
    /// called from within a tokio runtime.
    pub fn initiate_shutdown(self: &Arc<Self>) -> ShutdownCompletion {
        if self
            .state
            .compare_exchange(
                ShutdownState::NotShuttingDown as u8,
                ShutdownState::ShuttingDown as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            info!(
                log_type = LogType::Shutdown.as_str(),
                "Shutdown already in progress"
            );
            return ShutdownCompletion::resolved(ShutdownOutcome::AlreadyInProgress);
        }

        info!(
            log_type = LogType::Shutdown.as_str(),
            "Initiating graceful shutdown..."
        );

        let orchestrator = Arc::clone(self);
        let handle = tokio::spawn(async move { orchestrator.run_graceful_pass().await });

        ShutdownCompletion {
            inner: CompletionInner::Pending(handle),
        }
    }

    /// Releases the wait of the graceful pass. Only the first call matters; a
    /// signal sent before the pass starts waiting is remembered.
    pub fn signal_completion(&self) {
        if !self.completion.send_replace(true) {
            debug!(
                log_type = LogType::Shutdown.as_str(),
                "Shutdown completion signal received"
            );
        }
    }

    /// Waits until the graceful pass has finished. Never resolves if shutdown
    /// was not initiated.
    pub async fn wait_finished(&self) {
        let mut finished = self.finished.subscribe();
        loop {
            let done = *finished.borrow_and_update();
            if done || finished.changed().await.is_err() {
                return;
            }
        }
    }

    /// Runs every forced hook and exits the process with a non-zero status,
    /// bypassing any pending graceful wait.
    pub fn force_shutdown(&self) -> ! {
        self.notify_forced();
        std::process::exit(FORCED_EXIT_CODE);
    }

    pub(crate) fn notify_forced(&self) {
        let previous = self
            .state
            .swap(ShutdownState::Forced as u8, Ordering::AcqRel);
        if previous == ShutdownState::Forced as u8 {
            return;
        }

        warn!(
            log_type = LogType::Shutdown.as_str(),
            "Forcing immediate shutdown"
        );

        let listeners = self.listeners.read().clone();
        for listener in &listeners {
            match catch_unwind(AssertUnwindSafe(|| listener.on_force_shutdown())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(
                    log_type = LogType::Shutdown.as_str(),
                    "Error in force shutdown listener {}: {:#}",
                    listener.name(),
                    e
                ),
                Err(panic) => error!(
                    log_type = LogType::Shutdown.as_str(),
                    "Force shutdown listener {} panicked: {}",
                    listener.name(),
                    panic_message(panic.as_ref())
                ),
            }
        }
    }

    fn target(&self) -> Option<Arc<dyn ShutdownTarget>> {
        self.target.read().as_ref().and_then(Weak::upgrade)
    }

    async fn run_graceful_pass(&self) -> ShutdownOutcome {
        let started = Instant::now();

        self.notify_listeners().await;

        if let Some(target) = self.target() {
            if target.is_running() {
                info!(
                    log_type = LogType::Shutdown.as_str(),
                    "Shutting down main application"
                );
                target.shutdown().await;
            }
        }

        info!(
            log_type = LogType::Shutdown.as_str(),
            "Waiting for operations to complete (timeout: {:?})", self.timeout
        );

        let outcome = match tokio::time::timeout(self.timeout, self.wait_for_completion()).await {
            Ok(()) => {
                info!(
                    log_type = LogType::Shutdown.as_str(),
                    "All operations completed successfully"
                );
                ShutdownOutcome::Completed
            }
            Err(_) => {
                warn!(
                    log_type = LogType::Shutdown.as_str(),
                    "Shutdown timeout reached after {:?}", self.timeout
                );
                ShutdownOutcome::TimedOut
            }
        };

        *self.outcome.lock() = Some(outcome);
        let _ = self.state.compare_exchange(
            ShutdownState::ShuttingDown as u8,
            ShutdownState::Completed as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        info!(
            log_type = LogType::Shutdown.as_str(),
            "Graceful shutdown completed in {}ms",
            started.elapsed().as_millis()
        );
        self.finished.send_replace(true);

        outcome
    }

    async fn notify_listeners(&self) {
        // Snapshot so no lock is held while a hook runs.
        let listeners = self.listeners.read().clone();

        info!(
            log_type = LogType::Shutdown.as_str(),
            "Notifying {} shutdown listeners",
            listeners.len()
        );

        for listener in &listeners {
            match AssertUnwindSafe(listener.on_shutdown()).catch_unwind().await {
                Ok(Ok(())) => debug!(
                    log_type = LogType::Shutdown.as_str(),
                    "Shutdown listener {} notified",
                    listener.name()
                ),
                Ok(Err(e)) => error!(
                    log_type = LogType::Shutdown.as_str(),
                    "Error notifying shutdown listener {}: {:#}",
                    listener.name(),
                    e
                ),
                Err(panic) => error!(
                    log_type = LogType::Shutdown.as_str(),
                    "Shutdown listener {} panicked: {}",
                    listener.name(),
                    panic_message(panic.as_ref())
                ),
            }
        }
    }

    async fn wait_for_completion(&self) {
        let mut completion = self.completion.subscribe();
        loop {
            let done = *completion.borrow_and_update();
            if done || completion.changed().await.is_err() {
                return;
            }
        }
    }
}

impl std::fmt::Debug for ShutdownOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownOrchestrator")
            .field("state", &self.state())
            .field("listeners", &self.listener_count())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[derive(Default)]
    struct ForcedCounter {
        forced: AtomicUsize,
    }

    impl ShutdownListener for ForcedCounter {
        fn on_force_shutdown(&self) -> anyhow::Result<()> {
            self.forced.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingForced;

    impl ShutdownListener for FailingForced {
        fn on_force_shutdown(&self) -> anyhow::Result<()> {
            anyhow::bail!("socket already closed")
        }
    }

    #[test]
    fn test_forced_hooks_run_once_and_isolate_failures() {
        let orchestrator = ShutdownOrchestrator::new(Duration::from_secs(1));
        let counter = Arc::new(ForcedCounter::default());
        orchestrator.register_listener(Arc::new(FailingForced));
        orchestrator.register_listener(counter.clone());

        orchestrator.notify_forced();
        orchestrator.notify_forced();

        assert_eq!(counter.forced.load(Ordering::SeqCst), 1);
        assert_eq!(orchestrator.state(), ShutdownState::Forced);
        assert!(orchestrator.is_shutting_down());
    }

    #[tokio::test]
    async fn test_initiate_after_forced_is_a_no_op() {
        let orchestrator = ShutdownOrchestrator::new(Duration::from_secs(1));
        orchestrator.notify_forced();

        let completion = orchestrator.initiate_shutdown();
        assert!(completion.is_resolved());
        assert_eq!(completion.await, ShutdownOutcome::AlreadyInProgress);
        assert_eq!(orchestrator.last_outcome(), None);
    }

    #[test]
    fn test_default_listener_name_is_type_name() {
        let listener: Arc<dyn ShutdownListener> = Arc::new(ForcedCounter::default());
        assert!(listener.name().ends_with("ForcedCounter"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ShutdownOutcome::Completed.exit_code(), 0);
        assert_eq!(ShutdownOutcome::TimedOut.exit_code(), 0);
        assert_eq!(ShutdownOutcome::Failed.exit_code(), FORCED_EXIT_CODE);
    }
}
