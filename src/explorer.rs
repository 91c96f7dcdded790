/// Query facade over one ledger store
///
/// Composes the repositories, aggregators and the operation joiner around a
/// single shared store handle. Every entry point validates its arguments
/// before touching the store; nothing here writes to the ledger.
use crate::aggregate::{HolderAggregator, HolderInfo, HolderPortfolio, SnapshotBuilder, TokenSnapshot};
use crate::amount::Amount;
use crate::config::Config;
use crate::errors::ExplorerResult;
use crate::ledger::{AddressBalance, AddressPortfolio, Operation, TokenBalance, TokenListItem, TokenMeta};
use crate::logger::{self, LogTag};
use crate::operations::{index_cursor, OperationJoiner};
use crate::pagination::{CursorPage, Page};
use crate::repos::{BalanceRepository, TokenMetaRepository};
use crate::store::{LedgerStore, RetryPolicy};
use crate::validation::{require_address, require_hash, require_tick};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cap on a single retry wait for the operation listing
const OPERATIONS_RETRY_MAX_DELAY_MS: u64 = 2_000;

#[derive(Clone)]
pub struct Explorer {
    balances: BalanceRepository,
    tokens: TokenMetaRepository,
    holders: HolderAggregator,
    snapshots: SnapshotBuilder,
    operations: OperationJoiner,
}

impl Explorer {
    pub fn new(store: Arc<dyn LedgerStore>, config: &Config) -> Self {
        let balances = BalanceRepository::new(store.clone(), config.store.balance_page_size);
        let tokens = TokenMetaRepository::new(store.clone());
        let holders = HolderAggregator::new(
            store.clone(),
            balances.clone(),
            tokens.clone(),
            config.holders.clone(),
            config.addresses.clone(),
            config.store.scan_page_size,
        );
        let snapshots = SnapshotBuilder::new(balances.clone(), tokens.clone(), config.holders.tie_break);
        let retry = RetryPolicy::new(
            config.store.operations_retry_attempts,
            config.store.operations_retry_delay_ms,
            OPERATIONS_RETRY_MAX_DELAY_MS,
        );
        let operations = OperationJoiner::new(store, retry, config.operations.clone());

        logger::debug(
            LogTag::System,
            &format!(
                "Explorer ready (balance page {}, scan page {}, tie break {:?})",
                config.store.balance_page_size, config.store.scan_page_size, config.holders.tie_break
            ),
        );

        Self {
            balances,
            tokens,
            holders,
            snapshots,
            operations,
        }
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    /// Unranked non-zero holder rows of one token
    pub async fn token_balances(
        &self,
        tick: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Vec<TokenBalance>> {
        let tick = require_tick(tick)?;
        let records = self.balances.balances_for_tick(&tick, cancel).await?;
        Ok(records.iter().map(TokenBalance::from).collect())
    }

    pub async fn token_info(&self, tick: &str, cancel: &CancellationToken) -> ExplorerResult<TokenMeta> {
        let tick = require_tick(tick)?;
        self.tokens.meta_for_tick(&tick, cancel).await
    }

    pub async fn all_tokens(&self, cancel: &CancellationToken) -> ExplorerResult<Vec<TokenListItem>> {
        let tokens = self.tokens.all_meta(cancel).await?;
        Ok(tokens.iter().map(TokenListItem::from).collect())
    }

    // ------------------------------------------------------------------
    // Holders and addresses
    // ------------------------------------------------------------------

    /// Every token an address holds; an unknown address has an empty list
    pub async fn address_balances(
        &self,
        address: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<AddressPortfolio> {
        let address = require_address(address)?;
        let records = self.balances.balances_for_address(&address, cancel).await?;
        Ok(AddressPortfolio {
            address,
            balances: records.iter().map(AddressBalance::from).collect(),
        })
    }

    pub async fn ranked_holders(
        &self,
        tick: &str,
        page: Option<i64>,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Page<HolderInfo>> {
        let tick = require_tick(tick)?;
        self.holders.ranked_holders(&tick, page, page_size, cancel).await
    }

    pub async fn top_holders(
        &self,
        page: Option<i64>,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Page<HolderPortfolio>> {
        self.holders.cross_token_top_holders(page, page_size, cancel).await
    }

    /// Address catalog page; an empty or missing `last_address` starts at the beginning
    pub async fn all_addresses(
        &self,
        last_address: Option<&str>,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<CursorPage<AddressPortfolio, String>> {
        let last_address = last_address.map(str::trim).filter(|a| !a.is_empty());
        self.holders.all_addresses(last_address, page_size, cancel).await
    }

    // ------------------------------------------------------------------
    // Supply
    // ------------------------------------------------------------------

    pub async fn snapshot(&self, tick: &str, cancel: &CancellationToken) -> ExplorerResult<TokenSnapshot> {
        let tick = require_tick(tick)?;
        self.snapshots.snapshot(&tick, cancel).await
    }

    pub async fn circulating_supply(
        &self,
        tick: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Amount> {
        let tick = require_tick(tick)?;
        self.snapshots.circulating_supply(&tick, cancel).await
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub async fn operation_by_hash(
        &self,
        hash: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Operation> {
        let hash = require_hash(hash)?;
        self.operations.operation_by_hash(&hash, cancel).await
    }

    /// Operations touching one token, newest first. Resume with either
    /// `last_score` (from `next_cursor`) or `offset`.
    pub async fn operations_for_tick(
        &self,
        tick: &str,
        last_score: Option<i64>,
        offset: Option<i64>,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<CursorPage<Operation, u64>> {
        let tick = require_tick(tick)?;
        let cursor = index_cursor(last_score, offset)?;
        self.operations
            .operations_for_tick(&tick, cursor, page_size, cancel)
            .await
    }

    pub async fn all_operations(
        &self,
        last_score: Option<i64>,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<CursorPage<Operation, u64>> {
        let cursor = index_cursor(last_score, None)?;
        self.operations.all_operations(cursor, page_size, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExplorerError;
    use crate::store::seed::LedgerSeeder;
    use crate::store::SqliteStore;

    fn seeded() -> (Arc<SqliteStore>, Explorer) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let seeder = LedgerSeeder::new(&store);
        seeder.token("KASP", "1000000");
        seeder.token("NACHO", "500");
        seeder.balance("kaspa:alice", "KASP", "400000", "0");
        seeder.balance("kaspa:bob", "KASP", "100000", "100000");
        seeder.balance("kaspa:bob", "NACHO", "5", "0");
        seeder.balance("kaspa:carol", "NACHO", "0", "0");
        seeder.operation(11, "tx11", "KASP", "mint");
        seeder.operation(12, "tx12", "NACHO", "transfer");
        let explorer = Explorer::new(store.clone(), &Config::default());
        (store, explorer)
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_the_store() {
        let (_store, explorer) = seeded();
        // A cancelled token fails any store call with Cancelled, so getting
        // InvalidArgument back means validation ran first.
        let cancel = CancellationToken::new();
        cancel.cancel();

        for err in [
            explorer.token_info("AB12", &cancel).await.unwrap_err(),
            explorer.snapshot("ABCDEFG", &cancel).await.unwrap_err(),
            explorer.ranked_holders("", None, None, &cancel).await.unwrap_err(),
            explorer.address_balances("   ", &cancel).await.unwrap_err(),
            explorer.operation_by_hash("", &cancel).await.unwrap_err(),
            explorer
                .operations_for_tick("KASP", Some(1), Some(1), None, &cancel)
                .await
                .unwrap_err(),
        ] {
            assert!(matches!(err, ExplorerError::InvalidArgument { .. }), "{err}");
        }

        let err = explorer.token_info("KASP", &cancel).await.unwrap_err();
        assert!(matches!(err, ExplorerError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_tick_input_is_sanitized() {
        let (_store, explorer) = seeded();
        let cancel = CancellationToken::new();
        let meta = explorer.token_info("  kasp ", &cancel).await.unwrap();
        assert_eq!(meta.tick, "KASP");
        assert_eq!(meta.max, Amount::from(1_000_000));

        let holders = explorer.token_balances("nacho", &cancel).await.unwrap();
        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].address, "kaspa:bob");
    }

    #[tokio::test]
    async fn test_address_and_catalog_views() {
        let (_store, explorer) = seeded();
        let cancel = CancellationToken::new();

        let portfolio = explorer.address_balances("kaspa:bob", &cancel).await.unwrap();
        let ticks: Vec<_> = portfolio.balances.iter().map(|b| b.tick.as_str()).collect();
        assert_eq!(ticks, vec!["KASP", "NACHO"]);

        let unknown = explorer.address_balances("kaspa:nobody", &cancel).await.unwrap();
        assert!(unknown.balances.is_empty());

        let tokens = explorer.all_tokens(&cancel).await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].hash_rev, "deploy-KASP");

        let addresses = explorer.all_addresses(Some(""), None, &cancel).await.unwrap();
        let listed: Vec<_> = addresses.items.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(listed, vec!["kaspa:alice", "kaspa:bob"]);
        assert!(!addresses.has_more);

        let top = explorer.top_holders(None, None, &cancel).await.unwrap();
        assert_eq!(top.items[0].address, "kaspa:bob");
        assert_eq!(top.items[0].token_count, 2);
        assert_eq!(top.total, 2);
    }

    #[tokio::test]
    async fn test_supply_and_holders() {
        let (_store, explorer) = seeded();
        let cancel = CancellationToken::new();

        let page = explorer.ranked_holders("KASP", Some(1), Some(10), &cancel).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].rank, 1);
        assert_eq!(page.items[0].share, 40.0);

        let snapshot = explorer.snapshot("KASP", &cancel).await.unwrap();
        let supply = explorer.circulating_supply("KASP", &cancel).await.unwrap();
        assert_eq!(supply.to_string(), "900000");
        assert_eq!(supply, snapshot.summary.circulating_supply);
    }

    #[tokio::test]
    async fn test_operation_views() {
        let (_store, explorer) = seeded();
        let cancel = CancellationToken::new();

        let op = explorer.operation_by_hash(" tx12 ", &cancel).await.unwrap();
        assert_eq!(op.tick, "NACHO");

        let kasp = explorer
            .operations_for_tick("kasp", None, None, None, &cancel)
            .await
            .unwrap();
        assert_eq!(kasp.items.len(), 1);
        assert_eq!(kasp.items[0].hash_rev, "tx11");

        let all = explorer.all_operations(None, Some(1), &cancel).await.unwrap();
        assert_eq!(all.items[0].hash_rev, "tx12");
        assert!(all.has_more);
        let rest = explorer
            .all_operations(all.next_cursor.map(|s| s as i64), Some(1), &cancel)
            .await
            .unwrap();
        assert_eq!(rest.items[0].hash_rev, "tx11");
        assert!(!rest.has_more);
    }
}
