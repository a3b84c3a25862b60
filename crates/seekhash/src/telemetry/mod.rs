pub mod tracing;

pub use self::tracing::init_subscriber;
