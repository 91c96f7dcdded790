/// Logger runtime configuration
///
/// Built from command-line flags at `init`, then merged with the `[logging]`
/// config section once the config file is loaded. Flags win over the file.
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;
use crate::config::LoggingConfig;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub debug_tags: HashSet<LogTag>,
    pub console_enabled: bool,
    pub file_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            console_enabled: true,
            file_path: None,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    match LOGGER_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(_) => LoggerConfig::default(),
    }
}

pub fn set_logger_config(config: LoggerConfig) {
    if let Ok(mut current) = LOGGER_CONFIG.write() {
        *current = config;
    }
}

pub fn update_logger_config<F>(f: F)
where
    F: FnOnce(&mut LoggerConfig),
{
    if let Ok(mut current) = LOGGER_CONFIG.write() {
        f(&mut current);
    }
}

/// Apply `--verbose`, `--quiet` and `--debug-<tag>` flags
pub fn init_from_args() {
    let args = arguments::get_cmd_args();
    update_logger_config(|config| apply_flags(config, &args));
}

/// Merge the `[logging]` config section, keeping any flag overrides
pub fn apply_settings(settings: &LoggingConfig) {
    let args = arguments::get_cmd_args();
    update_logger_config(|config| {
        merge_settings(config, settings);
        apply_flags(config, &args);
    });
}

pub(super) fn apply_flags(config: &mut LoggerConfig, args: &[String]) {
    if arguments::has_arg_in(args, "--verbose") || arguments::has_arg_in(args, "-v") {
        config.min_level = LogLevel::Verbose;
    } else if arguments::has_arg_in(args, "--quiet") || arguments::has_arg_in(args, "-q") {
        config.min_level = LogLevel::Warning;
    }
    for key in arguments::debug_keys_in(args) {
        if let Some(tag) = LogTag::from_debug_key(&key) {
            config.debug_tags.insert(tag);
        }
    }
}

pub(super) fn merge_settings(config: &mut LoggerConfig, settings: &LoggingConfig) {
    if let Some(level) = LogLevel::parse(&settings.level) {
        config.min_level = level;
    }
    config.debug_tags.extend(
        settings
            .debug_tags
            .iter()
            .filter_map(|key| LogTag::from_debug_key(key)),
    );
    config.console_enabled = settings.console;
    config.file_path = settings
        .file_path
        .clone()
        .filter(|p| !p.trim().is_empty());
}

pub fn is_debug_enabled_for_tag(config: &LoggerConfig, tag: &LogTag) -> bool {
    config.min_level == LogLevel::Verbose || config.debug_tags.contains(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flags_enable_debug_tags() {
        let mut config = LoggerConfig::default();
        apply_flags(&mut config, &args(&["tickscope", "--debug-holders", "--debug-bogus"]));
        assert!(is_debug_enabled_for_tag(&config, &LogTag::Holders));
        assert!(!is_debug_enabled_for_tag(&config, &LogTag::Store));
        assert_eq!(config.debug_tags.len(), 1);
    }

    #[test]
    fn test_flags_override_file_level() {
        let mut config = LoggerConfig::default();
        let settings = LoggingConfig {
            level: "error".to_string(),
            debug_tags: vec!["store".to_string()],
            ..LoggingConfig::default()
        };
        merge_settings(&mut config, &settings);
        assert_eq!(config.min_level, LogLevel::Error);
        assert!(config.debug_tags.contains(&LogTag::Store));
        assert_eq!(config.file_path, None);

        apply_flags(&mut config, &args(&["tickscope", "--quiet"]));
        assert_eq!(config.min_level, LogLevel::Warning);
    }
}
