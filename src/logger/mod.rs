//! Structured logging
//!
//! Level functions take a subsystem tag and a message:
//!
//! ```rust,ignore
//! use tickscope::logger::{self, LogTag};
//!
//! logger::info(LogTag::Webserver, "Listening on 0.0.0.0:8080");
//! logger::warning(LogTag::Holders, "Skipping malformed balance row");
//! logger::debug(LogTag::Store, "Scan page of 2000 rows"); // only with --debug-store
//! ```
//!
//! `init` reads command-line flags; `apply_settings` merges the `[logging]`
//! config section afterwards.

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, update_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Configure from command-line flags. Call once at startup.
pub fn init() {
    config::init_from_args();
}

/// Merge config file settings and open the log file if one is configured
pub fn apply_settings(settings: &crate::config::LoggingConfig) {
    config::apply_settings(settings);
    if let Some(path) = config::get_logger_config().file_path {
        file::init_file_logging(&path);
    }
}

/// Always shown
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Shown only with `--debug-<tag>`, `logging.debug_tags`, or verbose mode
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Shown only in verbose mode
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Flush pending file writes; call during shutdown
pub fn flush() {
    file::flush_file_logging();
}
