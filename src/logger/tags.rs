/// Log tags, one per subsystem
///
/// Each tag has a debug key used by `--debug-<key>` and `logging.debug_tags`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Store,
    Tokens,
    Balances,
    Holders,
    Snapshot,
    Operations,
    Webserver,
}

impl LogTag {
    pub const ALL: [LogTag; 9] = [
        LogTag::System,
        LogTag::Config,
        LogTag::Store,
        LogTag::Tokens,
        LogTag::Balances,
        LogTag::Holders,
        LogTag::Snapshot,
        LogTag::Operations,
        LogTag::Webserver,
    ];

    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Store => "store",
            LogTag::Tokens => "tokens",
            LogTag::Balances => "balances",
            LogTag::Holders => "holders",
            LogTag::Snapshot => "snapshot",
            LogTag::Operations => "operations",
            LogTag::Webserver => "webserver",
        }
    }

    /// Uppercase label printed in log lines
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Store => "STORE",
            LogTag::Tokens => "TOKENS",
            LogTag::Balances => "BALANCES",
            LogTag::Holders => "HOLDERS",
            LogTag::Snapshot => "SNAPSHOT",
            LogTag::Operations => "OPS",
            LogTag::Webserver => "WEBSERVER",
        }
    }

    pub fn from_debug_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|tag| tag.to_debug_key() == key)
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
