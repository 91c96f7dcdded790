/// Index-to-detail join for operation listings
use crate::config::OperationsConfig;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::ledger::{Operation, OperationDetail, OperationIndexEntry};
use crate::logger::{self, LogTag};
use crate::pagination::{cursor_page_size, split_overfetch, CursorPage};
use crate::store::{cancellable, IndexCursor, IndexRow, LedgerStore, RetryPolicy};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct OperationJoiner {
    store: Arc<dyn LedgerStore>,
    /// Applied to the tick-scoped index read only
    retry: RetryPolicy,
    config: OperationsConfig,
}

impl OperationJoiner {
    pub fn new(store: Arc<dyn LedgerStore>, retry: RetryPolicy, config: OperationsConfig) -> Self {
        Self {
            store,
            retry,
            config,
        }
    }

    /// Single operation by transaction id.
    ///
    /// The detail row is required. The index entry only contributes the
    /// sequence number, so its absence is not an error.
    pub async fn operation_by_hash(
        &self,
        txid: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Operation> {
        let row = cancellable(cancel, "operation detail", self.store.detail(txid))
            .await?
            .ok_or_else(|| ExplorerError::not_found("operation", txid))?;
        let detail = OperationDetail::decode(&row)?;

        let index = cancellable(
            cancel,
            "operation index lookup",
            self.store.index_entry_for_txid(txid),
        )
        .await?;
        let op_score = match index.as_ref().map(OperationIndexEntry::decode) {
            Some(Ok(entry)) => Some(entry.op_score),
            Some(Err(e)) => {
                logger::warning(LogTag::Operations, &format!("Ignoring index entry: {}", e));
                None
            }
            None => {
                logger::debug(
                    LogTag::Operations,
                    &format!("No index entry for {}, returning detail only", txid),
                );
                None
            }
        };

        Operation::reconstruct(detail, op_score)
    }

    /// Most recent operations touching `tick`
    pub async fn operations_for_tick(
        &self,
        tick: &str,
        cursor: IndexCursor,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<CursorPage<Operation, u64>> {
        let size = self.page_size(page_size);
        let fetch = size.saturating_add(1);
        let rows = self
            .retry
            .retry_async(cancel, move |attempt| {
                if attempt > 0 {
                    logger::warning(
                        LogTag::Operations,
                        &format!("Retrying {} operation index read (attempt {})", tick, attempt + 1),
                    );
                }
                cancellable(
                    cancel,
                    "tick operation index",
                    self.store.index_page(Some(tick), cursor, fetch),
                )
            })
            .await?;
        self.join_page(Some(tick), rows, size, cancel).await
    }

    /// Most recent operations across all ticks
    pub async fn all_operations(
        &self,
        cursor: IndexCursor,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<CursorPage<Operation, u64>> {
        let size = self.page_size(page_size);
        let rows = cancellable(
            cancel,
            "operation index",
            self.store.index_page(None, cursor, size.saturating_add(1)),
        )
        .await?;
        self.join_page(None, rows, size, cancel).await
    }

    fn page_size(&self, requested: Option<i64>) -> usize {
        cursor_page_size(
            requested,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    /// Join an over-fetched index batch to its detail rows.
    ///
    /// The cursor is the last entry consumed, joined or skipped, so skips
    /// never open a gap between pages.
    async fn join_page(
        &self,
        tick: Option<&str>,
        rows: Vec<IndexRow>,
        size: usize,
        cancel: &CancellationToken,
    ) -> ExplorerResult<CursorPage<Operation, u64>> {
        let (rows, has_more) = split_overfetch(rows, size);
        let next_cursor = rows
            .last()
            .and_then(|row| u64::try_from(row.op_score).ok());

        let mut operations = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for row in &rows {
            match self.join_one(tick, row, cancel).await? {
                Some(operation) => operations.push(operation),
                None => skipped += 1,
            }
        }

        logger::debug(
            LogTag::Operations,
            &format!(
                "{}: joined {} of {} index entries (skipped {}, more: {})",
                tick.unwrap_or("all ticks"),
                operations.len(),
                rows.len(),
                skipped,
                has_more
            ),
        );

        Ok(CursorPage {
            items: operations,
            page_size: size,
            has_more,
            next_cursor,
        })
    }

    /// `Ok(None)` means skip this entry; only storage failures and
    /// cancellation abort the page
    async fn join_one(
        &self,
        tick: Option<&str>,
        row: &IndexRow,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Option<Operation>> {
        let entry = match OperationIndexEntry::decode(row) {
            Ok(entry) => entry,
            Err(e) => {
                logger::warning(LogTag::Operations, &format!("Skipping index entry: {}", e));
                return Ok(None);
            }
        };
        if let Some(tick) = tick {
            if !entry.affects_tick(tick) {
                logger::debug(
                    LogTag::Operations,
                    &format!("Index entry {} does not list {}, skipping", entry.txid, tick),
                );
                return Ok(None);
            }
        }

        let Some(detail_row) =
            cancellable(cancel, "operation detail", self.store.detail(&entry.txid)).await?
        else {
            logger::warning(
                LogTag::Operations,
                &format!(
                    "Skipping operation {} (seq {}): detail row missing",
                    entry.txid, entry.op_score
                ),
            );
            return Ok(None);
        };

        let reconstructed = OperationDetail::decode(&detail_row)
            .and_then(|detail| Operation::reconstruct(detail, Some(entry.op_score)));
        match reconstructed {
            Ok(operation) => Ok(Some(operation)),
            Err(e) => {
                logger::warning(
                    LogTag::Operations,
                    &format!("Skipping operation (seq {}): {}", entry.op_score, e),
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed::LedgerSeeder;
    use crate::store::{BalanceRow, DetailRow, SqliteStore, TokenRow};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn joiner(store: Arc<dyn LedgerStore>, page_size: usize) -> OperationJoiner {
        OperationJoiner::new(
            store,
            RetryPolicy::new(3, 1, 5),
            OperationsConfig {
                default_page_size: page_size,
                max_page_size: 50,
            },
        )
    }

    fn scores(page: &CursorPage<Operation, u64>) -> Vec<String> {
        page.items.iter().map(|op| op.op_score.clone()).collect()
    }

    #[tokio::test]
    async fn test_missing_detail_is_skipped_not_failed() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let seeder = LedgerSeeder::new(&store);
        seeder.operation(50, "tx50", "TEST1", "mint");
        seeder.index_entry(42, "abc", "TEST1");
        seeder.operation(30, "tx30", "TEST1", "transfer");

        let page = joiner(store, 10)
            .operations_for_tick("TEST1", IndexCursor::Start, None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(scores(&page), vec!["50", "30"]);
        assert!(page.items.iter().all(|op| op.hash_rev != "abc"));
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, Some(30));
    }

    #[tokio::test]
    async fn test_malformed_detail_is_skipped() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let seeder = LedgerSeeder::new(&store);
        seeder.operation(20, "good", "KASP", "mint");
        seeder.index_entry(10, "bad", "KASP");
        seeder.detail("bad", "{not json", "{}");

        let page = joiner(store, 10)
            .all_operations(IndexCursor::Start, None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].hash_rev, "good");
    }

    #[tokio::test]
    async fn test_cursor_walk_has_no_gaps_or_repeats() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let seeder = LedgerSeeder::new(&store);
        for score in [70u64, 60, 50, 40, 30] {
            seeder.operation(score, &format!("tx{}", score), "NACHO", "transfer");
        }
        seeder.operation(65, "other", "KASP", "mint");

        let joiner = joiner(store, 2);
        let cancel = CancellationToken::new();

        let first = joiner
            .operations_for_tick("NACHO", IndexCursor::Start, None, &cancel)
            .await
            .unwrap();
        assert_eq!(scores(&first), vec!["70", "60"]);
        assert!(first.has_more);

        let second = joiner
            .operations_for_tick("NACHO", IndexCursor::Before(60), None, &cancel)
            .await
            .unwrap();
        assert_eq!(scores(&second), vec!["50", "40"]);
        assert!(second.has_more);

        let last = joiner
            .operations_for_tick("NACHO", IndexCursor::Before(40), None, &cancel)
            .await
            .unwrap();
        assert_eq!(scores(&last), vec!["30"]);
        assert!(!last.has_more);

        let offset = joiner
            .operations_for_tick("NACHO", IndexCursor::Offset(3), Some(5), &cancel)
            .await
            .unwrap();
        assert_eq!(scores(&offset), vec!["40", "30"]);

        let global = joiner
            .all_operations(IndexCursor::Start, Some(3), &cancel)
            .await
            .unwrap();
        assert_eq!(scores(&global), vec!["70", "65", "60"]);
        assert_eq!(global.next_cursor, Some(60));
    }

    #[tokio::test]
    async fn test_operation_by_hash() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let seeder = LedgerSeeder::new(&store);
        seeder.operation(42, "tx42", "KASP", "deploy");
        seeder.detail(
            "orphan",
            r#"{"p":"krc-20","op":"mint","tick":"KASP"}"#,
            r#"{"opscore":99,"fee":7}"#,
        );
        let joiner = joiner(store, 10);
        let cancel = CancellationToken::new();

        let op = joiner.operation_by_hash("tx42", &cancel).await.unwrap();
        assert_eq!(op.op, "deploy");
        assert_eq!(op.op_score, "42");
        assert_eq!(op.block_accept, "block-42");
        assert_eq!(op.op_accept, None);

        // detail without an index entry is still a valid result
        let op = joiner.operation_by_hash("orphan", &cancel).await.unwrap();
        assert_eq!(op.op_score, "99");
        assert_eq!(op.fee_rev, "7");

        let err = joiner.operation_by_hash("missing", &cancel).await.unwrap_err();
        assert!(matches!(err, ExplorerError::NotFound { .. }));
    }

    /// Fails the first `failures` index reads, then delegates
    struct FlakyStore {
        inner: SqliteStore,
        failures: usize,
        index_calls: AtomicUsize,
    }

    #[async_trait]
    impl LedgerStore for FlakyStore {
        async fn balances_for_address(&self, address: &str) -> ExplorerResult<Vec<BalanceRow>> {
            self.inner.balances_for_address(address).await
        }

        async fn balance_page_for_tick(
            &self,
            tick: &str,
            after_address: Option<&str>,
            limit: usize,
        ) -> ExplorerResult<Vec<BalanceRow>> {
            self.inner.balance_page_for_tick(tick, after_address, limit).await
        }

        async fn balance_scan_page(
            &self,
            after: Option<(&str, &str)>,
            limit: usize,
        ) -> ExplorerResult<Vec<BalanceRow>> {
            self.inner.balance_scan_page(after, limit).await
        }

        async fn addresses_after(
            &self,
            last_address: Option<&str>,
            limit: usize,
        ) -> ExplorerResult<Vec<String>> {
            self.inner.addresses_after(last_address, limit).await
        }

        async fn token_row(&self, tick: &str) -> ExplorerResult<Option<TokenRow>> {
            self.inner.token_row(tick).await
        }

        async fn token_rows(&self) -> ExplorerResult<Vec<TokenRow>> {
            self.inner.token_rows().await
        }

        async fn index_page(
            &self,
            tick: Option<&str>,
            cursor: IndexCursor,
            limit: usize,
        ) -> ExplorerResult<Vec<IndexRow>> {
            let call = self.index_calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(ExplorerError::storage("operation index page", "database is locked"));
            }
            self.inner.index_page(tick, cursor, limit).await
        }

        async fn index_entry_for_txid(&self, txid: &str) -> ExplorerResult<Option<IndexRow>> {
            self.inner.index_entry_for_txid(txid).await
        }

        async fn detail(&self, txid: &str) -> ExplorerResult<Option<DetailRow>> {
            self.inner.detail(txid).await
        }
    }

    fn flaky(failures: usize) -> Arc<FlakyStore> {
        let inner = SqliteStore::open_in_memory().unwrap();
        LedgerSeeder::new(&inner).operation(5, "tx5", "KASP", "mint");
        Arc::new(FlakyStore {
            inner,
            failures,
            index_calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_tick_listing_retries_transient_failures() {
        let store = flaky(2);
        let page = joiner(store.clone(), 10)
            .operations_for_tick("KASP", IndexCursor::Start, None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(store.index_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_and_global_listing_does_not_retry() {
        let store = flaky(5);
        let cancel = CancellationToken::new();
        let err = joiner(store.clone(), 10)
            .operations_for_tick("KASP", IndexCursor::Start, None, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::StorageUnavailable { .. }));
        assert_eq!(store.index_calls.load(Ordering::SeqCst), 3);

        let store = flaky(1);
        assert!(joiner(store.clone(), 10)
            .all_operations(IndexCursor::Start, None, &cancel)
            .await
            .is_err());
        assert_eq!(store.index_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_listing_stops() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        LedgerSeeder::new(&store).operation(1, "tx1", "KASP", "mint");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = joiner(store, 10)
            .all_operations(IndexCursor::Start, None, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::Cancelled { .. }));
    }
}
