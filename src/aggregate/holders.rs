/// Ranked holder listing for one token
use crate::amount::{share_percent, Amount};
use crate::config::{AddressesConfig, HoldersConfig, TieBreak};
use crate::errors::{ExplorerError, ExplorerResult};
use crate::ledger::BalanceRecord;
use crate::logger::{self, LogTag};
use crate::pagination::{Page, PageRequest};
use crate::repos::{BalanceRepository, TokenMetaRepository};
use crate::store::LedgerStore;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolderInfo {
    pub address: String,
    pub balance: Amount,
    pub locked: Amount,
    /// Percent of max supply
    pub share: f64,
    /// 1-based position in the full ranking
    pub rank: usize,
}

/// Builds holder rankings and portfolio views over the balance table
#[derive(Clone)]
pub struct HolderAggregator {
    pub(super) store: Arc<dyn LedgerStore>,
    pub(super) balances: BalanceRepository,
    pub(super) tokens: TokenMetaRepository,
    pub(super) holders: HoldersConfig,
    pub(super) addresses: AddressesConfig,
    pub(super) scan_page_size: usize,
}

impl HolderAggregator {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        balances: BalanceRepository,
        tokens: TokenMetaRepository,
        holders: HoldersConfig,
        addresses: AddressesConfig,
        scan_page_size: usize,
    ) -> Self {
        Self {
            store,
            balances,
            tokens,
            holders,
            addresses,
            scan_page_size: scan_page_size.max(1),
        }
    }

    /// One page of the token's holders ranked by `balance + locked`.
    ///
    /// The whole holder set is loaded and sorted so ranks and the total count
    /// are exact.
    pub async fn ranked_holders(
        &self,
        tick: &str,
        page: Option<i64>,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Page<HolderInfo>> {
        let request = PageRequest::new(page, page_size, self.holders.max_page_size as usize);
        let meta = self.tokens.meta_for_tick(tick, cancel).await?;
        let records = self.balances.balances_for_tick(tick, cancel).await?;

        let ranked = rank_holders(tick, &meta.max, records, self.holders.tie_break)?;
        let total = ranked.len();

        logger::debug(
            LogTag::Holders,
            &format!(
                "Ranked {} holders of {} (page {}, size {})",
                total, tick, request.page, request.page_size
            ),
        );

        Ok(Page {
            items: request.slice(ranked),
            request,
            total,
        })
    }
}

/// Sort records by total descending and assign rank and share.
///
/// A holder total above a non-zero max supply cannot come from a consistent
/// ledger and aborts the ranking.
pub(crate) fn rank_holders(
    tick: &str,
    max: &Amount,
    records: Vec<BalanceRecord>,
    tie_break: TieBreak,
) -> ExplorerResult<Vec<HolderInfo>> {
    let mut totals: Vec<(Amount, BalanceRecord)> = Vec::with_capacity(records.len());
    for record in records {
        let total = record.total();
        if !max.is_zero() && &total > max {
            return Err(ExplorerError::inconsistent(
                tick,
                format!(
                    "holder {} total {} exceeds max supply {}",
                    record.address, total, max
                ),
            ));
        }
        totals.push((total, record));
    }

    // sort_by is stable, so StoreOrder keeps the order rows arrived in
    totals.sort_by(|(a_total, a), (b_total, b)| {
        b_total.cmp(a_total).then_with(|| match tie_break {
            TieBreak::AddressAscending => a.address.cmp(&b.address),
            TieBreak::StoreOrder => Ordering::Equal,
        })
    });

    Ok(totals
        .into_iter()
        .enumerate()
        .map(|(position, (total, record))| HolderInfo {
            share: share_percent(&total, max),
            rank: position + 1,
            address: record.address,
            balance: record.balance,
            locked: record.locked,
        })
        .collect())
}
