//! Logger initialization over the `log` facade with an `env_logger` backend.

mod init;

pub use init::{LoggingConfig, init_logging, resolve_filter};
