use super::schemas::Config;
/// Configuration loading and access helpers
use crate::errors::{ExplorerError, ExplorerResult};
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use std::sync::RwLock;

/// Global configuration instance, set once at startup
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Read and validate a config file; a missing file means all defaults
pub fn read_config_file(path: &str) -> ExplorerResult<Config> {
    let config = if std::path::Path::new(path).exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExplorerError::Configuration(format!("Failed to read config file '{}': {}", path, e))
        })?;
        toml::from_str::<Config>(&contents).map_err(|e| {
            ExplorerError::Configuration(format!("Failed to parse config file '{}': {}", path, e))
        })?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        Config::default()
    };

    config
        .validate()
        .map_err(|e| ExplorerError::Configuration(format!("{}: {}", path, e)))?;
    Ok(config)
}

/// Load a config file into the global `CONFIG`
pub fn load_config_from_path(path: &str) -> ExplorerResult<()> {
    let config = read_config_file(path)?;
    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| ExplorerError::Configuration("Config already initialized".to_string()))?;
    logger::debug(LogTag::Config, &format!("Configuration loaded from {}", path));
    Ok(())
}

/// Read access to the global config; defaults apply before it is loaded
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match CONFIG.get().and_then(|lock| lock.read().ok()) {
        Some(config) => f(&config),
        None => f(&Config::default()),
    }
}

/// Owned copy, for handing sections to components at construction
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = read_config_file("/nonexistent/tickscope.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_reads_and_validates_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[webserver]\nport = 9090\n[addresses]\nmax_page_size = 500").unwrap();
        let config = read_config_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.webserver.port, 9090);
        assert_eq!(config.addresses.max_page_size, 500);

        // default_page_size 100 exceeds a cap of 10
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[addresses]\nmax_page_size = 10").unwrap();
        let err = read_config_file(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ExplorerError::Configuration(_)));
    }

    #[test]
    fn test_parse_error_is_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store\npath = ").unwrap();
        let err = read_config_file(file.path().to_str().unwrap()).unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION");
    }

    #[test]
    fn test_with_config_falls_back_to_defaults() {
        let port = with_config(|cfg| cfg.webserver.port);
        assert!(port > 0);
    }
}
