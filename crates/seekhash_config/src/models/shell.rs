use serde::Deserialize;

use super::{logging::LoggingConfig, shutdown::ShutdownConfig};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    pub app_name: String,

    pub version: String,

    pub prompt: String,

    pub use_color: bool,

    pub shutdown: ShutdownConfig,

    pub logging: LoggingConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            app_name: "seekhash".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            prompt: "> ".to_string(),
            use_color: true,
            shutdown: ShutdownConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
