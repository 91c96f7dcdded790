// Cross-token views: top holders by portfolio breadth, and the address catalog.

use super::holders::HolderAggregator;
use crate::amount::Amount;
use crate::errors::ExplorerResult;
use crate::ledger::{AddressBalance, AddressPortfolio, BalanceRecord};
use crate::logger::{self, LogTag};
use crate::pagination::{cursor_page_size, split_overfetch, CursorPage, Page, PageRequest};
use crate::store::cancellable;
use serde::Serialize;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Holdings of one address across every token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderPortfolio {
    pub address: String,
    /// Distinct ticks with a non-zero balance
    pub token_count: usize,
    /// Sum of `balance + locked` in raw units across all ticks
    pub total_value: Amount,
    pub holdings: Vec<AddressBalance>,
}

impl HolderPortfolio {
    fn new(address: String) -> Self {
        Self {
            address,
            token_count: 0,
            total_value: Amount::zero(),
            holdings: Vec::new(),
        }
    }

    fn add(&mut self, record: &BalanceRecord) {
        self.total_value += &record.total();
        self.holdings.push(AddressBalance::from(record));
        self.token_count = self.holdings.len();
    }
}

impl HolderAggregator {
    /// Addresses ranked by number of tokens held, then by summed raw value.
    ///
    /// Scans every non-zero balance row in the ledger per call; there is no
    /// precomputed index behind this.
    pub async fn cross_token_top_holders(
        &self,
        page: Option<i64>,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Page<HolderPortfolio>> {
        let request = PageRequest::new(
            page,
            page_size,
            self.holders.top_holders_max_page_size as usize,
        );

        let mut portfolios: BTreeMap<String, HolderPortfolio> = BTreeMap::new();
        let mut after: Option<(String, String)> = None;
        let mut scanned = 0usize;

        loop {
            let rows = cancellable(
                cancel,
                "ledger balance scan",
                self.store.balance_scan_page(
                    after.as_ref().map(|(a, t)| (a.as_str(), t.as_str())),
                    self.scan_page_size,
                ),
            )
            .await?;
            scanned += rows.len();

            let full_page = rows.len() == self.scan_page_size;
            after = rows.last().map(|row| (row.address.clone(), row.tick.clone()));

            for row in &rows {
                match BalanceRecord::decode(row) {
                    Ok(record) if record.is_empty() => {}
                    Ok(record) => portfolios
                        .entry(record.address.clone())
                        .or_insert_with(|| HolderPortfolio::new(record.address.clone()))
                        .add(&record),
                    Err(e) => {
                        logger::warning(LogTag::Holders, &format!("Skipping row: {}", e))
                    }
                }
            }

            if !full_page || after.is_none() {
                break;
            }
        }

        // BTreeMap yields address order, which the stable sort keeps for ties
        let mut ranked: Vec<HolderPortfolio> = portfolios.into_values().collect();
        ranked.sort_by(|a, b| {
            b.token_count
                .cmp(&a.token_count)
                .then_with(|| b.total_value.cmp(&a.total_value))
        });
        let total = ranked.len();

        logger::debug(
            LogTag::Holders,
            &format!(
                "Top holders: scanned {} rows into {} portfolios",
                scanned, total
            ),
        );

        Ok(Page {
            items: request.slice(ranked),
            request,
            total,
        })
    }

    /// Address catalog in key order, resumable from the last address seen.
    ///
    /// Addresses whose balances are all zero are left out of `items` but
    /// still move the cursor forward.
    pub async fn all_addresses(
        &self,
        last_address: Option<&str>,
        page_size: Option<i64>,
        cancel: &CancellationToken,
    ) -> ExplorerResult<CursorPage<AddressPortfolio, String>> {
        let size = cursor_page_size(
            page_size,
            self.addresses.default_page_size,
            self.addresses.max_page_size,
        );
        let after = last_address.filter(|a| !a.is_empty());

        let batch = cancellable(
            cancel,
            "address catalog",
            self.store.addresses_after(after, size + 1),
        )
        .await?;
        let (addresses, has_more) = split_overfetch(batch, size);

        let mut items = Vec::with_capacity(addresses.len());
        for address in &addresses {
            let records = self.balances.balances_for_address(address, cancel).await?;
            if records.is_empty() {
                continue;
            }
            items.push(AddressPortfolio {
                address: address.clone(),
                balances: records.iter().map(AddressBalance::from).collect(),
            });
        }

        Ok(CursorPage {
            items,
            page_size: size,
            has_more,
            next_cursor: addresses.last().cloned(),
        })
    }
}
