/// Command-line argument handling
///
/// Arguments are collected once into `CMD_ARGS` and queried by flag from
/// anywhere in the process. Lookups are split into slice-based helpers so
/// they can be tested without touching the global.
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Copy of the current arguments; falls back to `env::args` if the lock is poisoned
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

pub fn has_arg(arg: &str) -> bool {
    has_arg_in(&get_cmd_args(), arg)
}

/// Value following `flag`, if any
pub fn get_arg_value(flag: &str) -> Option<String> {
    arg_value_in(&get_cmd_args(), flag)
}

pub fn has_arg_in(args: &[String], arg: &str) -> bool {
    args.iter().any(|a| a == arg)
}

pub fn arg_value_in(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .filter(|value| !value.starts_with("--"))
        .cloned()
}

/// Tag keys passed as `--debug-<key>`
pub fn debug_keys_in(args: &[String]) -> Vec<String> {
    args.iter()
        .filter_map(|a| a.strip_prefix("--debug-"))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// Config file path (`--config <path>`)
pub fn get_config_path() -> Option<String> {
    get_arg_value("--config")
}

/// Ledger database path override (`--ledger <path>`)
pub fn get_ledger_path() -> Option<String> {
    get_arg_value("--ledger")
}

/// Listen port override (`--port <n>`)
pub fn get_port() -> Option<u16> {
    get_arg_value("--port").and_then(|p| p.parse().ok())
}

pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

pub fn is_version_requested() -> bool {
    has_arg("--version") || has_arg("-V")
}

/// Displays the help menu with all available flags and their descriptions
pub fn print_help() {
    println!("tickscope - KRC-20 ledger explorer query service");
    println!();
    println!("USAGE:");
    println!("    tickscope [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --config <path>           Config file (default: data/config.toml)");
    println!("    --ledger <path>           Ledger database, overrides store.path");
    println!("    --port <n>                Listen port, overrides webserver.port");
    println!("    --verbose, -v             Show verbose logs");
    println!("    --quiet, -q               Only show warnings and errors");
    println!("    --help, -h                Show this help message");
    println!("    --version, -V             Show version");
    println!();
    println!("DEBUG FLAGS:");
    println!("    --debug-system            Startup and shutdown");
    println!("    --debug-config            Config loading");
    println!("    --debug-store             Ledger store queries");
    println!("    --debug-tokens            Token metadata");
    println!("    --debug-balances          Balance lookups");
    println!("    --debug-holders           Holder ranking and portfolios");
    println!("    --debug-snapshot          Supply snapshots");
    println!("    --debug-operations        Operation listing and lookups");
    println!("    --debug-webserver         HTTP requests");
    println!();
    println!("EXAMPLES:");
    println!("    tickscope --ledger data/ledger.db");
    println!("    tickscope --config prod.toml --debug-holders");
}
