pub mod file;

pub use file::FileProvider;
