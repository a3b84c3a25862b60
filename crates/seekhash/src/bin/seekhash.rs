//! seekhash - interactive shell
//!
//! Command-line entry point: loads configuration, installs logging and signal
//! handling, runs the shell and exits with the shutdown status.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use seekhash::{
    Application, SeekhashError, ShellConfig, ShutdownOutcome, core::signal::install_signal_handler,
    telemetry,
};
use seekhash_config::{FileProvider, LogType};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file, `config.yaml` when present otherwise
    #[arg(long)]
    config_path: Option<PathBuf>,

    #[arg(long)]
    debug: bool,

    /// How long the graceful shutdown waits for completion, e.g. `10s`
    #[arg(long, value_parser = humantime::parse_duration)]
    shutdown_timeout: Option<Duration>,

    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn apply(&self, config: &mut ShellConfig) {
        if self.debug {
            config.logging.debug = true;
        }
        if let Some(timeout) = self.shutdown_timeout {
            config.shutdown.timeout = timeout;
        }
        if self.no_color {
            config.use_color = false;
            config.logging.use_color = false;
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let code = match run(args).await {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            error!(log_type = LogType::Shell.as_str(), "Fatal error: {}", e);
            eprintln!("Fatal error: {e}");
            1
        }
    };

    // The input thread may still be blocked on stdin, exit explicitly.
    process::exit(code);
}

async fn run(args: Args) -> Result<ShutdownOutcome, SeekhashError> {
    let mut config = FileProvider::try_load_config(args.config_path.as_deref())?;
    args.apply(&mut config);

    telemetry::init_subscriber(&config.logging)?;
    info!(log_type = LogType::Shell.as_str(), "Starting seekhash...");

    let app = Application::stdin(config);
    let orchestrator = app.orchestrator().clone();
    install_signal_handler(orchestrator.clone())?;

    if let Err(e) = app.start().await {
        error!(
            log_type = LogType::Shell.as_str(),
            "Shell terminated with error: {}", e
        );
        orchestrator.initiate_shutdown().await;
        orchestrator.wait_finished().await;
        return Err(e);
    }

    orchestrator.initiate_shutdown().await;
    orchestrator.wait_finished().await;

    let outcome = orchestrator
        .last_outcome()
        .unwrap_or(ShutdownOutcome::Completed);
    info!(
        log_type = LogType::Shell.as_str(),
        "seekhash stopped ({:?})", outcome
    );

    Ok(outcome)
}
