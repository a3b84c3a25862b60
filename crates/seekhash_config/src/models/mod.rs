pub mod logging;
pub mod shell;
pub mod shutdown;
