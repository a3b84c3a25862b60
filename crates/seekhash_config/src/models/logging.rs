use serde::Deserialize;
use tracing::Level;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub debug: bool,

    /// Overrides the level picked from `debug` and the build profile.
    pub min_level: Option<String>,

    pub use_color: bool,

    pub show_target: bool,

    pub show_timestamp: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            min_level: None,
            use_color: true,
            show_target: false,
            show_timestamp: true,
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> Level {
        self.min_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(if cfg!(debug_assertions) || self.debug {
                Level::DEBUG
            } else {
                Level::INFO
            })
    }
}

/// Value of the `log_type` field attached to every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogType {
    Shell,
    Command,
    Shutdown,
    Signal,
    Config,
}

impl LogType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogType::Shell => "shell",
            LogType::Command => "command",
            LogType::Shutdown => "shutdown",
            LogType::Signal => "signal",
            LogType::Config => "config",
        }
    }
}
