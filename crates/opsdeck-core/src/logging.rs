//! Logging initialization shared by hosts and tests.

use tracing::Level;

use crate::config::LoggingConfig;

/// Install the global fmt subscriber at the configured level.
///
/// Safe to call more than once; only the first call installs a subscriber.
/// An unrecognized level string falls back to `info`.
pub fn init_logging(config: &LoggingConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}
