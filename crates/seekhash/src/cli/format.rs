//! ANSI styling helpers for console output

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    pub const RESET: &'static str = "\x1B[0m";
    pub const BOLD: &'static str = "\x1B[1m";

    pub const RED: &'static str = "\x1B[31m";
    pub const GREEN: &'static str = "\x1B[32m";
    pub const YELLOW: &'static str = "\x1B[33m";
    pub const BLUE: &'static str = "\x1B[34m";
    pub const CYAN: &'static str = "\x1B[36m";
    pub const GRAY: &'static str = "\x1B[90m";

    pub const BOLD_GREEN: &'static str = "\x1B[1;32m";
}

/// Erases the current terminal line and returns the cursor to its start.
pub const CLEAR_LINE: &str = "\r\x1B[K";

/// Colorizes text with the given color
pub fn colorize(text: &str, color: &str) -> String {
    format!("{}{}{}", color, text, Colors::RESET)
}

/// Formats a banner header with bold green
pub fn header(text: &str) -> String {
    colorize(text, Colors::BOLD_GREEN)
}

/// Formats a command name with cyan
pub fn entity(text: &str) -> String {
    colorize(text, Colors::CYAN)
}

/// Formats a warning with yellow
pub fn warning(text: &str) -> String {
    colorize(text, Colors::YELLOW)
}

/// Formats an error with red
pub fn error(text: &str) -> String {
    colorize(text, Colors::RED)
}

/// Formats secondary information with gray
pub fn secondary(text: &str) -> String {
    colorize(text, Colors::GRAY)
}

/// Formats a success message with green
pub fn success(text: &str) -> String {
    colorize(text, Colors::GREEN)
}

/// Formats the prompt with bold
pub fn label(text: &str) -> String {
    colorize(text, Colors::BOLD)
}

/// Formats an info message with blue
pub fn info(text: &str) -> String {
    colorize(text, Colors::BLUE)
}
