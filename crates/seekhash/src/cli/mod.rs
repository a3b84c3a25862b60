//! Interactive shell surface: commands, console output and shutdown coordination.

pub mod command;
pub mod commands;
pub mod console;
pub mod format;
pub mod progress;
pub mod shutdown;

pub use command::{Command, CommandFuture, CommandRegistry, CommandResult};
pub use console::{ConsoleUi, StdConsole};
pub use progress::ProgressBar;
pub use shutdown::{
    ShutdownCompletion, ShutdownListener, ShutdownOrchestrator, ShutdownOutcome, ShutdownState,
    ShutdownTarget,
};
