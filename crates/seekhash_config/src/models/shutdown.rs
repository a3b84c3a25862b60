use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_INPUT_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long the graceful pass waits for the completion signal.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// How long the application waits for its input worker before aborting it.
    #[serde(with = "humantime_serde")]
    pub input_join_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            input_join_timeout: DEFAULT_INPUT_JOIN_TIMEOUT,
        }
    }
}
