/// Point-in-time holder snapshots and supply figures
///
/// `circulating = max supply - total locked`, computed with unbounded
/// integers. Locked totals above max supply are reported as an inconsistent
/// ledger rather than clamped.
use super::holders::rank_holders;
use crate::amount::Amount;
use crate::config::TieBreak;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::ledger::BalanceRecord;
use crate::logger::{self, LogTag};
use crate::repos::{BalanceRepository, TokenMetaRepository};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotHolder {
    pub address: String,
    pub balance: Amount,
    pub locked: Amount,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub total_supply: Amount,
    pub holders_count: usize,
    pub locked_tokens: Amount,
    pub circulating_supply: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSnapshot {
    pub tick: String,
    /// Unix seconds at capture
    pub timestamp: i64,
    pub holders: Vec<SnapshotHolder>,
    pub summary: SnapshotSummary,
}

#[derive(Clone)]
pub struct SnapshotBuilder {
    balances: BalanceRepository,
    tokens: TokenMetaRepository,
    tie_break: TieBreak,
}

impl SnapshotBuilder {
    pub fn new(balances: BalanceRepository, tokens: TokenMetaRepository, tie_break: TieBreak) -> Self {
        Self {
            balances,
            tokens,
            tie_break,
        }
    }

    /// Every holder with its share plus the supply summary.
    ///
    /// Undecodable token metadata fails the snapshot; an empty snapshot would
    /// read as a token without holders.
    pub async fn snapshot(
        &self,
        tick: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<TokenSnapshot> {
        let meta = self.tokens.meta_for_tick(tick, cancel).await?;
        let records = self.balances.balances_for_tick(tick, cancel).await?;

        let summary = summarize(tick, &meta.max, &records)?;
        let holders = rank_holders(tick, &meta.max, records, self.tie_break)?
            .into_iter()
            .map(|holder| SnapshotHolder {
                address: holder.address,
                balance: holder.balance,
                locked: holder.locked,
                share: holder.share,
            })
            .collect();

        Ok(TokenSnapshot {
            tick: tick.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            holders,
            summary,
        })
    }

    /// Same figure as `snapshot(tick).summary.circulating_supply`, without
    /// ranking the holders
    pub async fn circulating_supply(
        &self,
        tick: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<Amount> {
        let meta = self.tokens.meta_for_tick(tick, cancel).await?;
        let records = self.balances.balances_for_tick(tick, cancel).await?;
        Ok(summarize(tick, &meta.max, &records)?.circulating_supply)
    }
}

/// Supply summary shared by both snapshot entry points
fn summarize(tick: &str, max: &Amount, records: &[BalanceRecord]) -> ExplorerResult<SnapshotSummary> {
    let mut locked_total = Amount::zero();
    let mut gross_total = Amount::zero();
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
        locked_total += &record.locked;
        gross_total += &total;
    }

    let circulating = max.checked_sub(&locked_total).ok_or_else(|| {
        ExplorerError::inconsistent(
            tick,
            format!("locked total {} exceeds max supply {}", locked_total, max),
        )
    })?;

    logger::debug(
        LogTag::Snapshot,
        &format!(
            "{}: {} holders, held {}, locked {}, circulating {}",
            tick,
            records.len(),
            gross_total,
            locked_total,
            circulating
        ),
    );

    Ok(SnapshotSummary {
        total_supply: max.clone(),
        holders_count: records.len(),
        locked_tokens: locked_total,
        circulating_supply: circulating,
    })
}
