//! The interactive read-dispatch loop and its teardown.

mod input;

use self::input::LineReader;

use std::io::{self, BufRead, BufReader};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use seekhash_config::{LogType, ShellConfig};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cli::command::{Command, CommandRegistry, split_command_line};
use crate::cli::commands::{ExitCommand, HelpCommand};
use crate::cli::console::{ConsoleUi, StdConsole};
use crate::cli::shutdown::{ShutdownOrchestrator, ShutdownTarget};
use crate::core::error::{Result, SeekhashError, panic_message};

tokio::task_local! {
    static INPUT_WORKER: ();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ApplicationState {
    Stopped = 0,
    Running = 1,
    Stopping = 2,
}

impl ApplicationState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ApplicationState::Running,
            2 => ApplicationState::Stopping,
            _ => ApplicationState::Stopped,
        }
    }
}

pub struct Application {
    config: ShellConfig,
    registry: Arc<CommandRegistry>,
    console: Arc<dyn ConsoleUi>,
    orchestrator: Arc<ShutdownOrchestrator>,

    running: AtomicBool,
    started: AtomicBool,
    state: AtomicU8,

    input: Mutex<Option<Box<dyn BufRead + Send>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    stop: watch::Sender<bool>,
    worker_done: watch::Sender<bool>,
}

impl Application {
    /// Builds the application with the built-in `help` and `exit` commands
    /// registered and itself attached to a fresh shutdown orchestrator.
    pub fn new(
        config: ShellConfig,
        console: Arc<dyn ConsoleUi>,
        input: Box<dyn BufRead + Send>,
    ) -> Arc<Self> {
        let orchestrator = ShutdownOrchestrator::new(config.shutdown.timeout);
        let registry = Arc::new(CommandRegistry::new());
        let (stop, _) = watch::channel(false);
        let (worker_done, _) = watch::channel(false);

        let app = Arc::new_cyclic(|weak: &Weak<Application>| {
            let target: Weak<dyn ShutdownTarget> = weak.clone();
            registry.register(Arc::new(HelpCommand::new(Arc::downgrade(&registry))));
            registry.register(Arc::new(ExitCommand::new(target.clone())));
            orchestrator.attach(target);

            Application {
                config,
                registry: Arc::clone(&registry),
                console,
                orchestrator: Arc::clone(&orchestrator),
                running: AtomicBool::new(true),
                started: AtomicBool::new(false),
                state: AtomicU8::new(ApplicationState::Stopped as u8),
                input: Mutex::new(Some(input)),
                worker: Mutex::new(None),
                stop,
                worker_done,
            }
        });

        info!(log_type = LogType::Shell.as_str(), "Application initialized");
        app
    }

    /// Application reading from stdin and writing to stdout.
    pub fn stdin(config: ShellConfig) -> Arc<Self> {
        let console = Arc::new(StdConsole::stdout(&config));
        Self::new(config, console, Box::new(BufReader::new(io::stdin())))
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn register_command(&self, command: Arc<dyn Command>) {
        self.registry.register(command);
    }

    pub fn orchestrator(&self) -> &Arc<ShutdownOrchestrator> {
        &self.orchestrator
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ApplicationState {
        ApplicationState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Runs the shell until the input worker finishes, then completes the
    /// application shutdown.
    ///
    /// The worker finishes on `exit`, on end of input, or when [`shutdown`]
    /// is called from elsewhere. An application can only be started once.
    ///
    /// [`shutdown`]: Application::shutdown
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(SeekhashError::AlreadyStarted);
        }

        if !self.is_running() {
            info!(
                log_type = LogType::Shell.as_str(),
                "Shutdown requested before start, not reading input"
            );
            return Ok(());
        }

        let source = self.input.lock().take();
        let Some(source) = source else {
            return Err(SeekhashError::AlreadyStarted);
        };
        let lines = input::spawn_line_reader(source)?;

        self.state
            .store(ApplicationState::Running as u8, Ordering::Release);
        self.console.show_welcome();
        info!(log_type = LogType::Shell.as_str(), "Application started");

        let stop = self.stop.subscribe();
        let mut done = self.worker_done.subscribe();
        let app = Arc::clone(self);
        let worker = tokio::spawn(INPUT_WORKER.scope((), app.run_input_loop(lines, stop)));
        *self.worker.lock() = Some(worker);

        loop {
            let finished = *done.borrow_and_update();
            if finished || done.changed().await.is_err() {
                break;
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Stops the shell. Safe to call concurrently and repeatedly; only the
    /// first call does anything.
    ///
    /// The running flag drops before the worker is told to stop, so a command
    /// already executing may finish but no further line is dispatched. The
    /// worker gets `input_join_timeout` to finish before it is aborted. Called
    /// from within the worker itself (the `exit` command) the join is skipped.
    pub async fn shutdown(&self) {
        if self
            .running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(
                log_type = LogType::Shell.as_str(),
                "Application shutdown already in progress"
            );
            return;
        }

        info!(
            log_type = LogType::Shell.as_str(),
            "Initiating application shutdown..."
        );

        self.state
            .store(ApplicationState::Stopping as u8, Ordering::Release);
        self.stop.send_replace(true);

        if INPUT_WORKER.try_with(|_| ()).is_ok() {
            debug!(
                log_type = LogType::Shell.as_str(),
                "Shutdown requested by a command, input worker stops after it"
            );
        } else {
            self.join_worker().await;
        }

        self.console.show_goodbye();
        self.state
            .store(ApplicationState::Stopped as u8, Ordering::Release);
        info!(
            log_type = LogType::Shell.as_str(),
            "Application shutdown complete"
        );

        self.orchestrator.signal_completion();
    }

    /// Looks up and runs the command named by the first word of `input`.
    ///
    /// Failures and panics of the command are reported on the console and
    /// never propagate.
    pub async fn dispatch(&self, input: &str) {
        let (name, args) = split_command_line(input.trim());
        let name = name.to_lowercase();

        let Some(command) = self.registry.lookup(&name) else {
            warn!(
                log_type = LogType::Command.as_str(),
                "Unknown command: {}", name
            );
            self.console.show_unknown_command(&name);
            return;
        };

        info!(
            log_type = LogType::Command.as_str(),
            "Executing command: {} with args: {}", name, args
        );

        match AssertUnwindSafe(command.execute(args)).catch_unwind().await {
            Ok(Ok(output)) => {
                if !output.is_empty() {
                    self.console.show_output(&output);
                }
                debug!(
                    log_type = LogType::Command.as_str(),
                    "Command executed successfully: {}", name
                );
            }
            Ok(Err(e)) => {
                error!(
                    log_type = LogType::Command.as_str(),
                    "Command execution failed: {}: {:#}", name, e
                );
                self.console
                    .show_error(&format!("Command execution failed: {e}"));
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    log_type = LogType::Command.as_str(),
                    "Command panicked: {}: {}", name, message
                );
                self.console
                    .show_error(&format!("Command execution failed: {message}"));
            }
        }
    }

    async fn run_input_loop(
        self: Arc<Self>,
        lines: LineReader,
        mut stop: watch::Receiver<bool>,
    ) {
        let _done = WorkerDone(Arc::clone(&self));

        while self.is_running() {
            self.console.show_prompt();

            let line = tokio::select! {
                biased;
                _ = stop.changed() => break,
                line = lines.next_line() => line,
            };

            let Some(line) = line else {
                debug!(
                    log_type = LogType::Shell.as_str(),
                    "Input exhausted, leaving the read loop"
                );
                break;
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            debug!(
                log_type = LogType::Shell.as_str(),
                "Received command: {}", input
            );
            self.dispatch(input).await;
        }

        // Release the reader thread before the worker reports itself done.
        drop(lines);
        info!(log_type = LogType::Shell.as_str(), "CLI input loop finished");
    }

    async fn join_worker(&self) {
        let worker = self.worker.lock().take();
        let Some(mut worker) = worker else {
            return;
        };

        let join_timeout = self.config.shutdown.input_join_timeout;
        match tokio::time::timeout(join_timeout, &mut worker).await {
            Ok(Ok(())) => debug!(log_type = LogType::Shell.as_str(), "Input worker stopped"),
            Ok(Err(e)) => warn!(
                log_type = LogType::Shell.as_str(),
                "Input worker ended abnormally: {}", e
            ),
            Err(_) => {
                warn!(
                    log_type = LogType::Shell.as_str(),
                    "Input worker did not terminate within {:?}, aborting it", join_timeout
                );
                worker.abort();
            }
        }
    }
}

#[async_trait]
impl ShutdownTarget for Application {
    fn is_running(&self) -> bool {
        Application::is_running(self)
    }

    async fn shutdown(&self) {
        Application::shutdown(self).await;
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("state", &self.state())
            .field("running", &self.is_running())
            .field("registry", &self.registry)
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

/// Marks the input worker as finished when dropped, including on abort.
struct WorkerDone(Arc<Application>);

impl Drop for WorkerDone {
    fn drop(&mut self) {
        self.0.worker_done.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn quiet_app() -> Arc<Application> {
        let config = ShellConfig::default();
        let console = Arc::new(StdConsole::with_writer(&config, Box::new(io::sink())));
        Application::new(config, console, Box::new(Cursor::new(Vec::new())))
    }

    #[tokio::test]
    async fn test_repeated_shutdown_logs_initiation_once() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = quiet_app();
        app.shutdown().await;
        app.shutdown().await;

        let output = String::from_utf8_lossy(&logs.0.lock()).into_owned();
        assert_eq!(output.matches("Initiating application shutdown").count(), 1);
        assert_eq!(output.matches("Application shutdown complete").count(), 1);
        assert_eq!(app.state(), ApplicationState::Stopped);
    }
}
