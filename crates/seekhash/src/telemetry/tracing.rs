use seekhash_config::LoggingConfig;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::error::{Result, SeekhashError};

/// Installs the global subscriber.
///
/// Events go to stderr so they never interleave with the shell output on
/// stdout. `RUST_LOG` takes precedence over the configured level.
pub fn init_subscriber(config: &LoggingConfig) -> Result<()> {
    let log_level = config.level();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "seekhash={log_level},seekhash_config={log_level}"
            ))
        })
        .map_err(|e| SeekhashError::logging(e.to_string()))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(config.use_color)
        .with_target(config.show_target)
        .with_level(true);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if config.show_timestamp {
        registry.with(fmt_layer).try_init()
    } else {
        registry.with(fmt_layer.without_time()).try_init()
    };

    installed.map_err(|e| SeekhashError::logging(e.to_string()))
}
