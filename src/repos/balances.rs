/// Balance lookups by address and by tick
///
/// Rows with both balance and locked at zero are dropped here, so every
/// caller sees only real holders. Rows whose amounts cannot be decoded are
/// skipped with a warning.
use crate::errors::ExplorerResult;
use crate::ledger::BalanceRecord;
use crate::logger::{self, LogTag};
use crate::store::{cancellable, BalanceRow, LedgerStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct BalanceRepository {
    store: Arc<dyn LedgerStore>,
    page_size: usize,
}

impl BalanceRepository {
    pub fn new(store: Arc<dyn LedgerStore>, page_size: usize) -> Self {
        Self {
            store,
            page_size: page_size.max(1),
        }
    }

    /// Every non-zero balance of one address; empty when the address has none
    pub async fn balances_for_address(
        &self,
        address: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Vec<BalanceRecord>> {
        let rows = cancellable(
            cancel,
            "balances for address",
            self.store.balances_for_address(address),
        )
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        decode_non_zero(&rows, &mut records);
        Ok(records)
    }

    /// Every non-zero holder row of one tick, in address order.
    ///
    /// Reads keyset pages of `page_size` rows so no single query has to
    /// return the whole holder set.
    pub async fn balances_for_tick(
        &self,
        tick: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Vec<BalanceRecord>> {
        let mut records = Vec::new();
        let mut after: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let rows = cancellable(
                cancel,
                "balances for tick",
                self.store
                    .balance_page_for_tick(tick, after.as_deref(), self.page_size),
            )
            .await?;
            pages += 1;

            let full_page = rows.len() == self.page_size;
            after = rows.last().map(|row| row.address.clone());
            decode_non_zero(&rows, &mut records);

            if !full_page || after.is_none() {
                break;
            }
        }

        logger::debug(
            LogTag::Balances,
            &format!(
                "Loaded {} holders of {} in {} page(s)",
                records.len(),
                tick,
                pages
            ),
        );
        Ok(records)
    }
}

/// Decode rows into `out`, skipping zero and undecodable rows
pub(crate) fn decode_non_zero(rows: &[BalanceRow], out: &mut Vec<BalanceRecord>) {
    for row in rows {
        match BalanceRecord::decode(row) {
            Ok(record) if record.is_empty() => {}
            Ok(record) => out.push(record),
            Err(e) => logger::warning(LogTag::Balances, &format!("Skipping row: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExplorerError;
    use crate::store::seed::LedgerSeeder;
    use crate::store::SqliteStore;

    fn store() -> Arc<SqliteStore> {
        Arc::new(SqliteStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_tick_balances_span_pages_and_drop_zero_rows() {
        let store = store();
        let seeder = LedgerSeeder::new(&store);
        for i in 0..7 {
            seeder.balance(&format!("kaspa:q{}", i), "KASP", "10", "0");
        }
        seeder.balance("kaspa:zero", "KASP", "0", "0");
        seeder.balance("kaspa:bad", "KASP", "ten", "0");

        let repo = BalanceRepository::new(store.clone(), 3);
        let records = repo
            .balances_for_tick("KASP", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 7);
        assert!(records.windows(2).all(|w| w[0].address < w[1].address));
    }

    #[tokio::test]
    async fn test_address_balances_empty_is_not_an_error() {
        let store = store();
        let repo = BalanceRepository::new(store.clone(), 100);
        let records = repo
            .balances_for_address("kaspa:nobody", &CancellationToken::new())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_address_balances_keep_locked_only_rows() {
        let store = store();
        let seeder = LedgerSeeder::new(&store);
        seeder.balance("kaspa:a", "KASP", "0", "50");
        seeder.balance("kaspa:a", "NACHO", "", "");

        let repo = BalanceRepository::new(store.clone(), 100);
        let records = repo
            .balances_for_address("kaspa:a", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tick, "KASP");
    }

    #[tokio::test]
    async fn test_cancelled_before_first_page() {
        let store = store();
        let repo = BalanceRepository::new(store.clone(), 100);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = repo.balances_for_tick("KASP", &cancel).await.unwrap_err();
        assert!(matches!(err, ExplorerError::Cancelled { .. }));
    }
}
