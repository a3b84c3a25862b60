use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use seekhash_config::LogType;
use tracing::debug;

/// A named, user-invocable unit of behavior.
///
/// `execute` receives everything after the command name, leading whitespace
/// removed, and resolves to the text to show the user (empty for nothing).
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn usage(&self) -> &'static str;
    fn execute(&self, args: &str) -> CommandFuture;
}

pub type CommandResult = anyhow::Result<String>;
pub type CommandFuture = std::pin::Pin<Box<dyn std::future::Future<Output = CommandResult> + Send>>;

#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Arc<dyn Command>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `command` under its lower-cased name, replacing any previous
    /// command with the same name.
    pub fn register(&self, command: Arc<dyn Command>) {
        let name = command.name().to_lowercase();
        if self.commands.write().insert(name.clone(), command).is_some() {
            debug!(
                log_type = LogType::Command.as_str(),
                "Replaced existing command: {}", name
            );
        } else {
            debug!(
                log_type = LogType::Command.as_str(),
                "Registered command: {}", name
            );
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.read().get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.read().contains_key(&name.to_lowercase())
    }

    /// All commands, sorted by name.
    pub fn list_all(&self) -> Vec<Arc<dyn Command>> {
        let commands = self.commands.read();
        let mut entries: Vec<_> = commands.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
            .into_iter()
            .map(|(_, command)| Arc::clone(command))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

/// Splits a trimmed input line into the command name and the raw remainder.
pub(crate) fn split_command_line(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (input, ""),
    }
}
