pub mod exit;
pub mod help;

pub use exit::ExitCommand;
pub use help::HelpCommand;
