//! Ledger store access
//!
//! The ledger itself is owned by the external ingestion engine. This module
//! defines the read contract the query core depends on (`LedgerStore`) and a
//! SQLite client implementing it.
//!
//! Every trait method is a single suspension point. Callers running
//! multi-query aggregations wrap each call in [`cancellable`] so an abandoned
//! request stops issuing queries.
//!
//! Reads are not isolated from each other: two calls may observe ledger
//! states on either side of a concurrent ingestion write.

pub mod retry;
pub mod rows;
pub mod schema;
pub mod sqlite;

#[cfg(test)]
pub mod seed;

use crate::errors::{ExplorerError, ExplorerResult};
use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub use retry::RetryPolicy;
pub use rows::{BalanceRow, DetailRow, IndexCursor, IndexRow, TokenRow};
pub use sqlite::SqliteStore;

/// Read access to the ledger tables.
///
/// Implementations must be safe for concurrent use from many requests at once.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// All balance rows of one address, in tick order
    async fn balances_for_address(&self, address: &str) -> ExplorerResult<Vec<BalanceRow>>;

    /// Keyset page of one tick's balance rows, in address order, strictly after `after_address`
    async fn balance_page_for_tick(
        &self,
        tick: &str,
        after_address: Option<&str>,
        limit: usize,
    ) -> ExplorerResult<Vec<BalanceRow>>;

    /// Keyset page over every non-zero balance row, in (address, tick) order,
    /// strictly after `after`
    async fn balance_scan_page(
        &self,
        after: Option<(&str, &str)>,
        limit: usize,
    ) -> ExplorerResult<Vec<BalanceRow>>;

    /// Distinct addresses with at least one balance row, ascending, strictly after `last_address`
    async fn addresses_after(
        &self,
        last_address: Option<&str>,
        limit: usize,
    ) -> ExplorerResult<Vec<String>>;

    async fn token_row(&self, tick: &str) -> ExplorerResult<Option<TokenRow>>;

    async fn token_rows(&self) -> ExplorerResult<Vec<TokenRow>>;

    /// Index entries by descending sequence, optionally restricted to one affected tick
    async fn index_page(
        &self,
        tick: Option<&str>,
        cursor: IndexCursor,
        limit: usize,
    ) -> ExplorerResult<Vec<IndexRow>>;

    async fn index_entry_for_txid(&self, txid: &str) -> ExplorerResult<Option<IndexRow>>;

    async fn detail(&self, txid: &str) -> ExplorerResult<Option<DetailRow>>;
}

/// Run one store call unless the request has been abandoned.
///
/// Cancellation wins over a pending result, so a cancelled request never
/// starts another query.
pub async fn cancellable<T, F>(
    cancel: &CancellationToken,
    operation: &'static str,
    call: F,
) -> ExplorerResult<T>
where
    F: Future<Output = ExplorerResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(ExplorerError::Cancelled { operation });
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExplorerError::Cancelled { operation }),
        result = call => result,
    }
}
