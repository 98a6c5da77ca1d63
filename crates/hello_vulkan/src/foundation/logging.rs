//! Logging utilities
//!
//! Library code only talks to the `log` facade. Binaries call [`init`] once
//! at startup to install `env_logger` as the backend.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// `RUST_LOG` wins when it is set; otherwise `default_level` (e.g. `"info"`,
/// `"hello_vulkan=debug"`) is used as the filter. Output goes to stderr.
/// Calling this more than once is harmless: later calls are ignored.
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
