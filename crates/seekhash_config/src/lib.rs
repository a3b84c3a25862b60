pub mod error;
pub mod models;
pub mod provider;

pub use error::ConfigError;
pub use models::logging::{LogType, LoggingConfig};
pub use models::shell::ShellConfig;
pub use models::shutdown::ShutdownConfig;
pub use provider::FileProvider;

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_provider() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(
            &config_path,
            "app_name: hashdb\nprompt: 'hashdb> '\nshutdown:\n  timeout: 2s\n  input_join_timeout: 250ms\nlogging:\n  debug: true\n",
        )
        .unwrap();

        let config = FileProvider::try_load_config(Some(&config_path)).unwrap();
        assert_eq!(config.app_name, "hashdb");
        assert_eq!(config.prompt, "hashdb> ");
        assert_eq!(config.shutdown.timeout, Duration::from_secs(2));
        assert_eq!(config.shutdown.input_join_timeout, Duration::from_millis(250));
        assert!(config.logging.debug);
        // untouched sections keep their defaults
        assert!(config.use_color);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing.yaml");

        let result = FileProvider::try_load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "\n").unwrap();

        let config = FileProvider::try_load_config(Some(&config_path)).unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "shutdown:\n  timeout: soon\n").unwrap();

        let result = FileProvider::try_load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
