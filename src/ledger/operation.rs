/// Operation index entries, detail records, and the reconstructed output record
use crate::errors::{ExplorerError, ExplorerResult};
use crate::store::rows::{DetailRow, IndexRow};
use serde::{Deserialize, Serialize};

/// Narrow, sequence-ordered index entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationIndexEntry {
    pub op_range: i64,
    pub op_score: u64,
    pub txid: String,
    pub state: String,
    pub tick_affc: Vec<String>,
    pub address_affc: Vec<String>,
}

impl OperationIndexEntry {
    pub fn decode(row: &IndexRow) -> ExplorerResult<Self> {
        if row.op_score < 0 {
            return Err(ExplorerError::malformed(
                "operation index",
                row.txid.clone(),
                format!("negative sequence {}", row.op_score),
            ));
        }
        Ok(Self {
            op_range: row.op_range,
            op_score: row.op_score as u64,
            txid: row.txid.clone(),
            state: row.state.clone(),
            tick_affc: parse_affected(&row.tick_affc),
            address_affc: parse_affected(&row.address_affc),
        })
    }

    pub fn affects_tick(&self, tick: &str) -> bool {
        self.tick_affc.iter().any(|t| t == tick)
    }
}

/// Affected lists are stored as `KEY[=detail],KEY[=detail],...`
pub fn parse_affected(list: &str) -> Vec<String> {
    list.split(',')
        .map(|entry| entry.split('=').next().unwrap_or("").trim())
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parsed operation script
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OperationScript {
    pub p: Option<String>,
    pub op: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub tick: Option<String>,
    pub max: Option<String>,
    pub lim: Option<String>,
    pub pre: Option<String>,
    pub dec: Option<String>,
    pub amt: Option<String>,
    pub utxo: Option<String>,
    pub price: Option<String>,
}

// A detail row carries either a single script or the list the transaction contained.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptBlob {
    One(OperationScript),
    Many(Vec<OperationScript>),
}

/// Acceptance metadata stored in the detail row's state blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OperationState {
    pub blockaccept: Option<String>,
    pub fee: Option<u64>,
    pub feeleast: Option<u64>,
    pub mtsadd: Option<i64>,
    pub opscore: Option<u64>,
    pub opaccept: Option<i8>,
    pub operror: Option<String>,
    pub checkpoint: Option<String>,
}

/// Wide detail record keyed by transaction id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDetail {
    pub txid: String,
    pub script: OperationScript,
    /// Undecoded acceptance blob; decoded only when the output is shaped
    pub state_blob: String,
    pub checkpoint: Option<String>,
}

impl OperationDetail {
    pub fn decode(row: &DetailRow) -> ExplorerResult<Self> {
        let script = match serde_json::from_str::<ScriptBlob>(&row.script) {
            Ok(ScriptBlob::One(script)) => script,
            Ok(ScriptBlob::Many(scripts)) => scripts.into_iter().next().ok_or_else(|| {
                ExplorerError::malformed("operation script", row.txid.clone(), "empty script list")
            })?,
            Err(e) => {
                return Err(ExplorerError::malformed(
                    "operation script",
                    row.txid.clone(),
                    e.to_string(),
                ))
            }
        };
        if script.op.as_deref().map_or(true, str::is_empty) {
            return Err(ExplorerError::malformed(
                "operation script",
                row.txid.clone(),
                "op missing",
            ));
        }
        Ok(Self {
            txid: row.txid.clone(),
            script,
            state_blob: row.state.clone(),
            checkpoint: row.checkpoint.clone().filter(|c| !c.is_empty()),
        })
    }
}

/// Reconstructed operation as returned to callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub p: String,
    pub op: String,
    pub tick: String,
    pub amt: String,
    pub from: String,
    pub to: String,
    pub op_score: String,
    pub hash_rev: String,
    pub fee_rev: String,
    pub fee_least: String,
    pub tx_accept: String,
    pub block_accept: String,
    /// Raw acceptance blob, present only until `promote_acceptance` runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op_accept: Option<String>,
    pub op_error: String,
    pub checkpoint: String,
    pub mts_add: String,
    pub mts_mod: String,
}

impl Operation {
    /// Build the output record from a detail row and, when known, its sequence
    pub fn from_detail(detail: OperationDetail, op_score: Option<u64>) -> Self {
        let script = detail.script;
        Self {
            p: script.p.unwrap_or_default(),
            op: script.op.unwrap_or_default(),
            tick: script.tick.unwrap_or_default(),
            amt: script.amt.unwrap_or_default(),
            from: script.from.unwrap_or_default(),
            to: script.to.unwrap_or_default(),
            op_score: op_score.map(|s| s.to_string()).unwrap_or_default(),
            hash_rev: detail.txid,
            checkpoint: detail.checkpoint.unwrap_or_default(),
            op_accept: Some(detail.state_blob),
            ..Default::default()
        }
    }

    /// Decode the acceptance blob, copy its fields onto the record, drop the blob.
    ///
    /// Output shaping only; nothing is written back to the store.
    pub fn promote_acceptance(&mut self) -> ExplorerResult<()> {
        let Some(blob) = self.op_accept.take() else {
            return Ok(());
        };
        let state: OperationState = if blob.trim().is_empty() {
            OperationState::default()
        } else {
            serde_json::from_str(&blob).map_err(|e| {
                ExplorerError::malformed("operation state", self.hash_rev.clone(), e.to_string())
            })?
        };

        if let Some(fee) = state.fee {
            self.fee_rev = fee.to_string();
        }
        if let Some(fee_least) = state.feeleast {
            self.fee_least = fee_least.to_string();
        }
        if let Some(accept) = state.opaccept {
            self.tx_accept = accept.to_string();
        }
        if let Some(block) = state.blockaccept {
            self.block_accept = block;
        }
        if let Some(error) = state.operror {
            self.op_error = error;
        }
        if let Some(checkpoint) = state.checkpoint.filter(|c| !c.is_empty()) {
            self.checkpoint = checkpoint;
        }
        if self.op_score.is_empty() {
            if let Some(score) = state.opscore {
                self.op_score = score.to_string();
            }
        }
        if let Some(mts) = state.mtsadd {
            // Accepted detail records are never modified afterwards
            self.mts_add = mts.to_string();
            self.mts_mod = mts.to_string();
        }
        Ok(())
    }

    /// `from_detail` followed by `promote_acceptance`
    pub fn reconstruct(detail: OperationDetail, op_score: Option<u64>) -> ExplorerResult<Self> {
        let mut operation = Self::from_detail(detail, op_score);
        operation.promote_acceptance()?;
        Ok(operation)
    }
}
