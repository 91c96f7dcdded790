use crate::errors::{ExplorerError, ExplorerResult};
use crate::ledger::TokenMeta;
use crate::logger::{self, LogTag};
use crate::store::{cancellable, LedgerStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Token metadata lookups
#[derive(Clone)]
pub struct TokenMetaRepository {
    store: Arc<dyn LedgerStore>,
}

impl TokenMetaRepository {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// `NotFound` when the tick was never deployed, `MalformedMetadata` when
    /// its blob cannot be decoded
    pub async fn meta_for_tick(
        &self,
        tick: &str,
        cancel: &CancellationToken,
    ) -> ExplorerResult<TokenMeta> {
        let row = cancellable(cancel, "token metadata", self.store.token_row(tick))
            .await?
            .ok_or_else(|| ExplorerError::not_found("token", tick))?;
        TokenMeta::decode(&row)
    }

    /// Full catalog in tick order; undecodable rows are skipped
    pub async fn all_meta(&self, cancel: &CancellationToken) -> ExplorerResult<Vec<TokenMeta>> {
        let rows = cancellable(cancel, "token list", self.store.token_rows()).await?;

        let mut tokens = Vec::with_capacity(rows.len());
        for row in &rows {
            match TokenMeta::decode(row) {
                Ok(meta) => tokens.push(meta),
                Err(e) => logger::warning(LogTag::Tokens, &format!("Skipping token: {}", e)),
            }
        }
        tokens.sort_by(|a, b| a.tick.cmp(&b.tick));
        Ok(tokens)
    }
}
