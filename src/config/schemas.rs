/// Configuration schemas
///
/// Every section is declared with `config_struct!`, so each field carries its
/// default inline and any subset of the TOML file is valid.
use crate::config_struct;
use serde::{Deserialize, Serialize};

// ============================================================================
// LEDGER STORE
// ============================================================================

config_struct! {
    /// Ledger database access
    pub struct StoreConfig {
        /// SQLite ledger file maintained by the ingestion engine
        path: String = "data/ledger.db".to_string(),
        read_connections: usize = 4,
        /// Rows per keyset page when reading one token's balances
        balance_page_size: usize = 10000,
        /// Rows per keyset page for the cross-token balance scan
        scan_page_size: usize = 2000,
        operations_retry_attempts: usize = 3,
        operations_retry_delay_ms: u64 = 100,
    }
}

// ============================================================================
// HOLDERS
// ============================================================================

/// Order among holders with equal totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Lexicographically smaller address ranks first
    AddressAscending,
    /// Keep the order rows came back from the store
    StoreOrder,
}

config_struct! {
    pub struct HoldersConfig {
        max_page_size: i64 = 20000,
        top_holders_max_page_size: i64 = 2000,
        tie_break: TieBreak = TieBreak::AddressAscending,
    }
}

// ============================================================================
// CURSOR-PAGED LISTINGS
// ============================================================================

config_struct! {
    pub struct OperationsConfig {
        default_page_size: usize = 1000,
        max_page_size: usize = 5000,
    }
}

config_struct! {
    pub struct AddressesConfig {
        default_page_size: usize = 100,
        max_page_size: usize = 1000,
    }
}

// ============================================================================
// WEBSERVER
// ============================================================================

config_struct! {
    pub struct WebserverConfig {
        enabled: bool = true,
        host: String = "0.0.0.0".to_string(),
        port: u16 = 8080,
        /// `*` allows any origin
        allowed_origins: Vec<String> = vec!["*".to_string()],
        /// Requests per client IP per window
        rate_limit_requests: usize = 100,
        rate_limit_window_secs: u64 = 60,
        request_timeout_secs: u64 = 30,
    }
}

// ============================================================================
// LOGGING
// ============================================================================

config_struct! {
    pub struct LoggingConfig {
        /// error | warning | info | debug | verbose
        level: String = "info".to_string(),
        /// Tags with debug output enabled, same keys as --debug-<tag>
        debug_tags: Vec<String> = Vec::new(),
        console: bool = true,
        file_path: Option<String> = None,
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    pub struct Config {
        store: StoreConfig = StoreConfig::default(),
        holders: HoldersConfig = HoldersConfig::default(),
        operations: OperationsConfig = OperationsConfig::default(),
        addresses: AddressesConfig = AddressesConfig::default(),
        webserver: WebserverConfig = WebserverConfig::default(),
        logging: LoggingConfig = LoggingConfig::default(),
    }
}

impl Config {
    /// Reject settings no component can run with
    pub fn validate(&self) -> Result<(), String> {
        if self.store.path.trim().is_empty() {
            return Err("store.path must not be empty".to_string());
        }
        if self.store.read_connections == 0 {
            return Err("store.read_connections must be at least 1".to_string());
        }
        if self.store.balance_page_size == 0 || self.store.scan_page_size == 0 {
            return Err("store page sizes must be at least 1".to_string());
        }
        if self.holders.max_page_size < 1 || self.holders.top_holders_max_page_size < 1 {
            return Err("holders page size limits must be at least 1".to_string());
        }
        check_cursor_sizes(
            "operations",
            self.operations.default_page_size,
            self.operations.max_page_size,
        )?;
        check_cursor_sizes(
            "addresses",
            self.addresses.default_page_size,
            self.addresses.max_page_size,
        )?;
        if self.webserver.rate_limit_requests == 0 || self.webserver.rate_limit_window_secs == 0 {
            return Err("webserver rate limit must allow at least 1 request per window".to_string());
        }
        if self.webserver.request_timeout_secs == 0 {
            return Err("webserver.request_timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

fn check_cursor_sizes(section: &str, default: usize, max: usize) -> Result<(), String> {
    if default == 0 || max == 0 {
        return Err(format!("{} page sizes must be at least 1", section));
    }
    if default > max {
        return Err(format!(
            "{}.default_page_size ({}) exceeds max_page_size ({})",
            section, default, max
        ));
    }
    Ok(())
}
