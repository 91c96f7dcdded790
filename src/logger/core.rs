/// Filtering rules and dispatch to the formatter
use super::config::{get_logger_config, is_debug_enabled_for_tag, LoggerConfig};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Filtering rules:
/// 1. Errors are always shown
/// 2. Anything above the minimum level is dropped
/// 3. Debug requires the tag's debug flag (or verbose mode)
pub fn should_log(config: &LoggerConfig, tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    if level == LogLevel::Debug {
        return is_debug_enabled_for_tag(config, tag);
    }

    level <= config.min_level
}

pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    let config = get_logger_config();
    if !should_log(&config, &tag, level) {
        return;
    }
    super::format::format_and_log(&config, tag, level, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filtering() {
        let config = LoggerConfig::default();
        assert!(should_log(&config, &LogTag::Store, LogLevel::Error));
        assert!(should_log(&config, &LogTag::Store, LogLevel::Warning));
        assert!(should_log(&config, &LogTag::Store, LogLevel::Info));
        assert!(!should_log(&config, &LogTag::Store, LogLevel::Debug));
        assert!(!should_log(&config, &LogTag::Store, LogLevel::Verbose));
    }

    #[test]
    fn test_debug_is_per_tag() {
        let mut config = LoggerConfig::default();
        config.debug_tags.insert(LogTag::Operations);
        assert!(should_log(&config, &LogTag::Operations, LogLevel::Debug));
        assert!(!should_log(&config, &LogTag::Holders, LogLevel::Debug));
    }

    #[test]
    fn test_quiet_keeps_errors_only() {
        let config = LoggerConfig {
            min_level: LogLevel::Error,
            ..LoggerConfig::default()
        };
        assert!(should_log(&config, &LogTag::System, LogLevel::Error));
        assert!(!should_log(&config, &LogTag::System, LogLevel::Warning));
    }
}
