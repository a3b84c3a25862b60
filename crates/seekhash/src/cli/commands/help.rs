use std::fmt::Write;
use std::sync::Weak;

use anyhow::anyhow;
use seekhash_config::LogType;
use tracing::debug;

use crate::cli::command::{Command, CommandFuture, CommandRegistry};

pub struct HelpCommand {
    registry: Weak<CommandRegistry>,
}

impl HelpCommand {
    pub fn new(registry: Weak<CommandRegistry>) -> Self {
        Self { registry }
    }

    fn all_commands(registry: &CommandRegistry) -> String {
        let mut help = String::new();

        for command in registry.list_all() {
            let _ = writeln!(help, "  {:<12} - {}", command.name(), command.description());
        }

        help.push_str("\nType 'help <command>' for specific command help");
        help
    }

    fn command_help(registry: &CommandRegistry, name: &str) -> String {
        match registry.lookup(name) {
            Some(command) => format!(
                "  Description: {}\n  Usage: {}",
                command.description(),
                command.usage()
            ),
            None => format!("Unknown command: {name}"),
        }
    }
}

impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Show available commands"
    }

    fn usage(&self) -> &'static str {
        "help [command]"
    }

    fn execute(&self, args: &str) -> CommandFuture {
        debug!(
            log_type = LogType::Command.as_str(),
            "Executing help command with args: {}", args
        );
        let registry = self.registry.clone();
        let topic = args.trim().to_string();

        Box::pin(async move {
            let registry = registry
                .upgrade()
                .ok_or_else(|| anyhow!("command registry is no longer available"))?;

            if topic.is_empty() {
                Ok(HelpCommand::all_commands(&registry))
            } else {
                Ok(HelpCommand::command_help(&registry, &topic))
            }
        })
    }
}
