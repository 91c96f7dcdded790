/// Error taxonomy for the ledger query core
///
/// Every repository, aggregator and joiner operation returns `ExplorerResult`.
/// Variants carry the entity and operation involved so failures can be
/// diagnosed without exposing query text.
use thiserror::Error;

pub type ExplorerResult<T> = Result<T, ExplorerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExplorerError {
    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Malformed {entity} for {key}: {reason}")]
    MalformedMetadata {
        entity: &'static str,
        key: String,
        reason: String,
    },

    #[error("Storage unavailable during {operation}: {reason}")]
    StorageUnavailable {
        operation: &'static str,
        reason: String,
    },

    #[error("Inconsistent ledger state for {tick}: {detail}")]
    InconsistentLedgerState { tick: String, detail: String },

    #[error("Request cancelled during {operation}")]
    Cancelled { operation: &'static str },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ExplorerError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ExplorerError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        ExplorerError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn malformed(
        entity: &'static str,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ExplorerError::MalformedMetadata {
            entity,
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(operation: &'static str, reason: impl std::fmt::Display) -> Self {
        ExplorerError::StorageUnavailable {
            operation,
            reason: reason.to_string(),
        }
    }

    pub fn inconsistent(tick: impl Into<String>, detail: impl Into<String>) -> Self {
        ExplorerError::InconsistentLedgerState {
            tick: tick.into(),
            detail: detail.into(),
        }
    }

    /// Storage failures are the only class worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExplorerError::StorageUnavailable { .. })
    }

    /// Stable machine-readable code used in API responses
    pub fn code(&self) -> &'static str {
        match self {
            ExplorerError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ExplorerError::NotFound { .. } => "NOT_FOUND",
            ExplorerError::MalformedMetadata { .. } => "MALFORMED_METADATA",
            ExplorerError::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            ExplorerError::InconsistentLedgerState { .. } => "INCONSISTENT_LEDGER_STATE",
            ExplorerError::Cancelled { .. } => "CANCELLED",
            ExplorerError::Configuration(_) => "CONFIGURATION",
        }
    }
}

impl From<tokio::task::JoinError> for ExplorerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ExplorerError::storage("blocking store task", err)
    }
}
