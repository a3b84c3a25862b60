use std::sync::Weak;

use seekhash_config::LogType;
use tracing::info;

use crate::cli::command::{Command, CommandFuture};
use crate::cli::shutdown::ShutdownTarget;

pub struct ExitCommand {
    target: Weak<dyn ShutdownTarget>,
}

impl ExitCommand {
    pub fn new(target: Weak<dyn ShutdownTarget>) -> Self {
        Self { target }
    }
}

impl Command for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn description(&self) -> &'static str {
        "Exit the application gracefully"
    }

    fn usage(&self) -> &'static str {
        "exit"
    }

    fn execute(&self, _args: &str) -> CommandFuture {
        let target = self.target.clone();

        Box::pin(async move {
            info!(log_type = LogType::Command.as_str(), "Exit command received");
            if let Some(target) = target.upgrade() {
                target.shutdown().await;
            }
            Ok(String::new())
        })
    }
}
