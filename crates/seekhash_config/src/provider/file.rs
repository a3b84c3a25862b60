use std::{fs, io, path::Path};

use tracing::debug;

use crate::{ConfigError, LogType, ShellConfig};

pub struct FileProvider;

impl FileProvider {
    pub const DEFAULT_PATH: &'static str = "config.yaml";

    /// Loads the shell configuration.
    ///
    /// Without an explicit path a missing `config.yaml` is not an error and the
    /// defaults are used. An explicit path must exist and parse.
    pub fn try_load_config(path: Option<&Path>) -> Result<ShellConfig, ConfigError> {
        let explicit = path.is_some();
        let path = path.unwrap_or_else(|| Path::new(Self::DEFAULT_PATH));

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if !explicit && e.kind() == io::ErrorKind::NotFound => {
                debug!(
                    log_type = LogType::Config.as_str(),
                    "No configuration file at '{}', using defaults",
                    path.display()
                );
                return Ok(ShellConfig::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(ShellConfig::default());
        }

        let config: ShellConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            log_type = LogType::Config.as_str(),
            "Loaded configuration from '{}': {:?}",
            path.display(),
            config
        );

        Ok(config)
    }
}
