use std::any::Any;
use std::io;

use seekhash_config::ConfigError;
use thiserror::Error;

/// Failures that stop the shell before or while it starts.
#[derive(Debug, Error)]
pub enum SeekhashError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging initialization failed: {0}")]
    Logging(String),

    #[error("Failed to install signal handler: {0}")]
    Signal(#[source] io::Error),

    #[error("Application already started")]
    AlreadyStarted,
}

impl SeekhashError {
    pub fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SeekhashError>;

/// Best effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
