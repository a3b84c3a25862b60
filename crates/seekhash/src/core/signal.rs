use std::sync::Arc;

use seekhash_config::LogType;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cli::shutdown::ShutdownOrchestrator;
use crate::core::error::{Result, SeekhashError};

#[cfg(unix)]
struct TerminationSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignals {
    fn install() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).map_err(SeekhashError::Signal)?,
            terminate: signal(SignalKind::terminate()).map_err(SeekhashError::Signal)?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
struct TerminationSignals;

#[cfg(not(unix))]
impl TerminationSignals {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(
                log_type = LogType::Signal.as_str(),
                "Failed to listen for Ctrl-C: {}", e
            );
            std::future::pending::<()>().await;
        }
        "Ctrl-C"
    }
}

/// Routes termination signals into the orchestrator.
///
/// The first signal starts the graceful shutdown; the caller observes it
/// through the orchestrator. A signal received while shutdown is already
/// running forces the process to exit.
pub fn install_signal_handler(orchestrator: Arc<ShutdownOrchestrator>) -> Result<JoinHandle<()>> {
    let mut signals = TerminationSignals::install()?;

    Ok(tokio::spawn(async move {
        loop {
            let signal = signals.recv().await;

            if orchestrator.is_shutting_down() {
                warn!(
                    log_type = LogType::Signal.as_str(),
                    "Received {} while shutting down, forcing exit", signal
                );
                orchestrator.force_shutdown();
            }

            info!(
                log_type = LogType::Signal.as_str(),
                "Shutdown triggered by {}", signal
            );
            drop(orchestrator.initiate_shutdown());
        }
    }))
}
