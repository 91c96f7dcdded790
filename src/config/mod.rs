//! Configuration system
//!
//! TOML file deserialized into `config_struct!` sections, held in a global
//! `CONFIG` after startup. Components get their section by value when built.

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{
    AddressesConfig, Config, HoldersConfig, LoggingConfig, OperationsConfig, StoreConfig,
    TieBreak, WebserverConfig,
};
pub use utils::{
    get_config_clone, load_config_from_path, read_config_file, with_config, CONFIG,
    CONFIG_FILE_PATH,
};
