/// Per-(address, tick) balance records and the views derived from them
use crate::amount::Amount;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::store::rows::BalanceRow;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRecord {
    pub address: String,
    pub tick: String,
    pub dec: u32,
    pub balance: Amount,
    pub locked: Amount,
    pub op_mod: u64,
}

impl BalanceRecord {
    pub fn decode(row: &BalanceRow) -> ExplorerResult<Self> {
        let key = format!("{}/{}", row.address, row.tick);
        let balance = Amount::parse(&row.balance)
            .map_err(|e| ExplorerError::malformed("balance", key.clone(), e.to_string()))?;
        let locked = Amount::parse(&row.locked)
            .map_err(|e| ExplorerError::malformed("balance", key, e.to_string()))?;
        Ok(Self {
            address: row.address.clone(),
            tick: row.tick.clone(),
            dec: row.dec.clamp(0, u32::MAX as i64) as u32,
            balance,
            locked,
            op_mod: row.op_mod.max(0) as u64,
        })
    }

    /// `balance + locked`
    pub fn total(&self) -> Amount {
        &self.balance + &self.locked
    }

    /// Rows with nothing available and nothing locked are not holders
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.locked.is_zero()
    }
}

/// One token held by an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressBalance {
    pub tick: String,
    pub balance: Amount,
    pub locked: Amount,
    #[serde(rename = "decimals")]
    pub dec: u32,
}

impl From<&BalanceRecord> for AddressBalance {
    fn from(record: &BalanceRecord) -> Self {
        Self {
            tick: record.tick.clone(),
            balance: record.balance.clone(),
            locked: record.locked.clone(),
            dec: record.dec,
        }
    }
}

/// One holder of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalance {
    pub address: String,
    pub balance: Amount,
    pub locked: Amount,
    #[serde(rename = "decimals")]
    pub dec: u32,
}

impl From<&BalanceRecord> for TokenBalance {
    fn from(record: &BalanceRecord) -> Self {
        Self {
            address: record.address.clone(),
            balance: record.balance.clone(),
            locked: record.locked.clone(),
            dec: record.dec,
        }
    }
}

/// Every non-zero balance of one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressPortfolio {
    pub address: String,
    pub balances: Vec<AddressBalance>,
}
