/// Token metadata decoded from the `sttoken` meta blob
use crate::amount::Amount;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::store::rows::TokenRow;
use serde::{Deserialize, Serialize};

/// Shape of the stored meta blob. Every field is optional at the JSON level;
/// `decode` decides which ones are required.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTokenMeta {
    max: Option<String>,
    lim: Option<String>,
    pre: Option<String>,
    dec: Option<u32>,
    from: Option<String>,
    to: Option<String>,
    txid: Option<String>,
    opadd: Option<u64>,
    mtsadd: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMeta {
    pub tick: String,
    pub max: Amount,
    pub lim: Amount,
    pub pre: Amount,
    pub dec: u32,
    pub from: String,
    pub to: String,
    pub txid: String,
    pub op_add: u64,
    pub mts_add: i64,
    pub minted: Amount,
    pub op_mod: u64,
    pub mts_mod: i64,
}

impl TokenMeta {
    /// Decode a token row, failing closed on a missing or unparsable max supply
    pub fn decode(row: &TokenRow) -> ExplorerResult<Self> {
        let malformed = |reason: String| ExplorerError::malformed("token meta", &row.tick, reason);

        let raw: RawTokenMeta = serde_json::from_str(&row.meta)
            .map_err(|e| malformed(format!("undecodable blob: {}", e)))?;

        let max = match raw.max.as_deref() {
            None => return Err(malformed("max supply missing".to_string())),
            Some(s) if s.trim().is_empty() => {
                return Err(malformed("max supply empty".to_string()))
            }
            Some(s) => {
                Amount::parse(s).map_err(|e| malformed(format!("max supply: {}", e)))?
            }
        };
        let lim = parse_optional(raw.lim.as_deref()).map_err(|e| malformed(format!("lim: {}", e)))?;
        let pre = parse_optional(raw.pre.as_deref()).map_err(|e| malformed(format!("pre: {}", e)))?;
        let minted = Amount::parse(&row.minted).map_err(|e| malformed(format!("minted: {}", e)))?;

        Ok(Self {
            tick: row.tick.clone(),
            max,
            lim,
            pre,
            dec: raw.dec.unwrap_or(0),
            from: raw.from.unwrap_or_default(),
            to: raw.to.unwrap_or_default(),
            txid: raw.txid.unwrap_or_default(),
            op_add: raw.opadd.unwrap_or(0),
            mts_add: raw.mtsadd.unwrap_or(0),
            minted,
            op_mod: row.op_mod.max(0) as u64,
            mts_mod: row.mts_mod,
        })
    }
}

fn parse_optional(value: Option<&str>) -> Result<Amount, crate::amount::AmountParseError> {
    match value {
        Some(s) => Amount::parse(s),
        None => Ok(Amount::zero()),
    }
}

/// Catalog entry, shaped like the token list the explorer front-end expects
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListItem {
    pub tick: String,
    pub max: Amount,
    pub lim: Amount,
    pub pre: Amount,
    pub to: String,
    pub dec: u32,
    pub minted: Amount,
    pub op_score_add: u64,
    pub op_score_mod: u64,
    pub state: &'static str,
    pub hash_rev: String,
    pub mts_add: i64,
}

impl From<&TokenMeta> for TokenListItem {
    fn from(meta: &TokenMeta) -> Self {
        Self {
            tick: meta.tick.clone(),
            max: meta.max.clone(),
            lim: meta.lim.clone(),
            pre: meta.pre.clone(),
            to: meta.to.clone(),
            dec: meta.dec,
            minted: meta.minted.clone(),
            op_score_add: meta.op_add,
            op_score_mod: meta.op_mod,
            // Only deployed tokens ever reach the table
            state: "finished",
            hash_rev: meta.txid.clone(),
            mts_add: meta.mts_add,
        }
    }
}
