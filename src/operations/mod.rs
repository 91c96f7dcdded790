//! Operation listings and lookups
//!
//! The index (`oplist`) is narrow and ordered by sequence; the wide detail
//! rows (`opdata`) are joined to it one transaction at a time. The join is
//! not snapshot-consistent: the ingestion engine may write between the index
//! read and the detail read, so an entry may come back without its detail.
//! Such entries are skipped, never failed.

pub mod joiner;

pub use joiner::OperationJoiner;

use crate::errors::{ExplorerError, ExplorerResult};
use crate::store::IndexCursor;

/// Resolve the two client cursor forms into an index position.
///
/// `lastScore` resumes strictly below a sequence; `offset` skips entries from
/// the most recent. Passing both is ambiguous and rejected.
pub fn index_cursor(last_score: Option<i64>, offset: Option<i64>) -> ExplorerResult<IndexCursor> {
    match (last_score, offset) {
        (Some(_), Some(_)) => Err(ExplorerError::invalid_argument(
            "lastScore",
            "cannot be combined with offset",
        )),
        (Some(score), None) if score < 0 => Err(ExplorerError::invalid_argument(
            "lastScore",
            "must not be negative",
        )),
        (None, Some(skip)) if skip < 0 => Err(ExplorerError::invalid_argument(
            "offset",
            "must not be negative",
        )),
        // 0 is what clients send for "from the top"
        (Some(0), None) => Ok(IndexCursor::Start),
        (Some(score), None) => Ok(IndexCursor::Before(score as u64)),
        (None, Some(0)) | (None, None) => Ok(IndexCursor::Start),
        (None, Some(skip)) => Ok(IndexCursor::Offset(
            usize::try_from(skip).unwrap_or(usize::MAX),
        )),
    }
}
