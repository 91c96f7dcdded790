/// Input validation shared by every tick/address/hash taking operation
///
/// All checks here run before any store access.
use crate::errors::{ExplorerError, ExplorerResult};

pub const TICK_MIN_LEN: usize = 4;
pub const TICK_MAX_LEN: usize = 6;

/// Trim surrounding whitespace and upper-case ASCII letters only
pub fn sanitize_tick(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// A tick is 4-6 characters, all uppercase ASCII letters
pub fn validate_tick(tick: &str) -> bool {
    (TICK_MIN_LEN..=TICK_MAX_LEN).contains(&tick.len())
        && tick.bytes().all(|b| b.is_ascii_uppercase())
}

/// Sanitize then validate, returning the canonical tick
pub fn require_tick(raw: &str) -> ExplorerResult<String> {
    let tick = sanitize_tick(raw);
    if validate_tick(&tick) {
        Ok(tick)
    } else {
        Err(ExplorerError::invalid_argument(
            "tick",
            "must be 4-6 uppercase letters (A-Z)",
        ))
    }
}

pub fn require_address(raw: &str) -> ExplorerResult<String> {
    require_non_empty("address", raw)
}

pub fn require_hash(raw: &str) -> ExplorerResult<String> {
    require_non_empty("hash", raw)
}

fn require_non_empty(field: &str, raw: &str) -> ExplorerResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ExplorerError::invalid_argument(field, "parameter is required"));
    }
    Ok(value.to_string())
}
