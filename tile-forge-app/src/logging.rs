//! Logging setup for the application.

use crate::config::{AppConfig, GlobalLogLevel, ProgressLogLevel};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Module path whose level is controlled by `--progress-log-level`.
pub const PROGRESS_MODULE: &str = "tile_forge_app::progress";

impl From<GlobalLogLevel> for LevelFilter {
    fn from(level: GlobalLogLevel) -> Self {
        match level {
            GlobalLogLevel::Trace => Self::Trace,
            GlobalLogLevel::Debug => Self::Debug,
            GlobalLogLevel::Info => Self::Info,
            GlobalLogLevel::Warn => Self::Warn,
            GlobalLogLevel::Error => Self::Error,
        }
    }
}

impl From<ProgressLogLevel> for LevelFilter {
    fn from(level: ProgressLogLevel) -> Self {
        match level {
            ProgressLogLevel::Trace => Self::Trace,
            ProgressLogLevel::Debug => Self::Debug,
            ProgressLogLevel::Info => Self::Info,
            ProgressLogLevel::Warn => Self::Warn,
        }
    }
}

/// Builds the logger for the given configuration without installing it.
///
/// The global level applies to every module; the progress module gets its own
/// level. Directives from `RUST_LOG` are parsed last and win.
pub fn build_logger(config: &AppConfig) -> Builder {
    let mut builder = Builder::new();
    builder.filter_level(config.global_log_level.into());
    builder.filter_module(PROGRESS_MODULE, config.progress_log_level.into());

    let env = Env::default();
    builder.parse_env(env);
    builder
}

/// Initializes the logger with the appropriate configuration based on the application settings.
///
/// Calling this more than once keeps the first logger.
pub fn init_logger(config: &AppConfig) {
    if build_logger(config).try_init().is_err() {
        log::debug!("Logger already initialized");
        return;
    }

    log::debug!(
        "Logger initialized with global log level: {:?}, progress log level: {:?}",
        config.global_log_level,
        config.progress_log_level
    );
}
