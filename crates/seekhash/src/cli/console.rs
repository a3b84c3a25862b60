use std::io::{self, Write};

use parking_lot::Mutex;
use seekhash_config::ShellConfig;

use crate::cli::format as fmt;

/// User-facing output of the shell.
///
/// All methods are fire-and-forget: write failures are not reported back to
/// the caller.
pub trait ConsoleUi: Send + Sync {
    fn show_welcome(&self);
    fn show_prompt(&self);
    fn show_goodbye(&self);
    fn show_error(&self, message: &str);
    fn show_unknown_command(&self, name: &str);

    /// Raw command output.
    fn show_output(&self, text: &str);

    fn show_success(&self, message: &str) {
        self.show_output(&format!("SUCCESS: {message}"));
    }

    fn show_warning(&self, message: &str) {
        self.show_output(&format!("WARNING: {message}"));
    }

    fn show_info(&self, message: &str) {
        self.show_output(&format!("INFO: {message}"));
    }

    fn show_result(&self, message: &str) {
        self.show_output(&format!("RESULT: {message}"));
    }

    fn show_progress(&self, current: u64, total: u64, message: &str);

    fn clear_line(&self);
}

/// Percentage of `current` over `total`, where an empty total counts as done.
pub(crate) fn percent(current: u64, total: u64) -> u64 {
    if total == 0 {
        100
    } else {
        current.min(total) * 100 / total
    }
}

pub struct StdConsole {
    out: Mutex<Box<dyn Write + Send>>,
    app_name: String,
    version: String,
    prompt: String,
    use_color: bool,
}

impl StdConsole {
    pub fn stdout(config: &ShellConfig) -> Self {
        Self::with_writer(config, Box::new(io::stdout()))
    }

    pub fn with_writer(config: &ShellConfig, out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            app_name: config.app_name.clone(),
            version: config.version.clone(),
            prompt: config.prompt.clone(),
            use_color: config.use_color,
        }
    }

    fn style(&self, text: &str, paint: fn(&str) -> String) -> String {
        if self.use_color {
            paint(text)
        } else {
            text.to_string()
        }
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn line(&self, text: &str) {
        self.write(&format!("{text}\n"));
    }
}

impl ConsoleUi for StdConsole {
    fn show_welcome(&self) {
        let banner = format!("=== {} v{} ===", self.app_name, self.version);
        self.line("");
        self.line(&self.style(&banner, fmt::header));
        self.line(&self.style("Type 'help' for available commands", fmt::secondary));
        self.line("");
    }

    fn show_prompt(&self) {
        self.write(&self.style(&self.prompt, fmt::label));
    }

    fn show_goodbye(&self) {
        self.line("");
        self.line("Goodbye!");
        self.line("");
    }

    fn show_error(&self, message: &str) {
        self.line(&self.style(&format!("ERROR: {message}"), fmt::error));
    }

    fn show_unknown_command(&self, name: &str) {
        self.line(&format!("Unknown command: {}", self.style(name, fmt::entity)));
        self.line(&self.style("Type 'help' for available commands", fmt::secondary));
    }

    fn show_output(&self, text: &str) {
        self.line(text);
    }

    fn show_success(&self, message: &str) {
        self.line(&self.style(&format!("SUCCESS: {message}"), fmt::success));
    }

    fn show_warning(&self, message: &str) {
        self.line(&self.style(&format!("WARNING: {message}"), fmt::warning));
    }

    fn show_info(&self, message: &str) {
        self.line(&self.style(&format!("INFO: {message}"), fmt::info));
    }

    fn show_progress(&self, current: u64, total: u64, message: &str) {
        let mut frame = format!(
            "\r[{current}/{total}] {}% {message}",
            percent(current, total)
        );
        if current >= total {
            frame.push('\n');
        }
        self.write(&frame);
    }

    fn clear_line(&self) {
        self.write(fmt::CLEAR_LINE);
    }
}
