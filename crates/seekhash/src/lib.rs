//! seekhash - an interactive command shell
//!
//! Lines read from stdin are dispatched to registered [`Command`]s. The shell
//! stops on the `exit` command, on a termination signal or on a fatal error,
//! and every path goes through the same [`ShutdownOrchestrator`] so that
//! shutdown listeners run exactly once.

pub mod application;
pub mod cli;
pub mod core;
pub mod telemetry;

pub use application::{Application, ApplicationState};
pub use cli::{
    Command, CommandFuture, CommandRegistry, CommandResult, ConsoleUi, ProgressBar,
    ShutdownCompletion, ShutdownListener, ShutdownOrchestrator, ShutdownOutcome, ShutdownState,
    ShutdownTarget, StdConsole,
};
pub use core::error::{Result, SeekhashError};
pub use seekhash_config::ShellConfig;
