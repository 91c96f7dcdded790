// Raw ledger rows exactly as the ingestion engine writes them.
// Amounts and blobs stay undecoded here; the repositories own decoding.

/// One `stbalance` row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub address: String,
    pub tick: String,
    pub dec: i64,
    pub balance: String,
    pub locked: String,
    pub op_mod: i64,
}

/// One `sttoken` row; `meta` is a JSON blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow {
    pub tick: String,
    pub meta: String,
    pub minted: String,
    pub op_mod: i64,
    pub mts_mod: i64,
}

/// One `oplist` row; affected lists are comma separated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub op_range: i64,
    pub op_score: i64,
    pub txid: String,
    pub state: String,
    pub tick_affc: String,
    pub address_affc: String,
}

/// One `opdata` row; `state` and `script` are JSON blobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub txid: String,
    pub state: String,
    pub script: String,
    pub checkpoint: Option<String>,
}

/// Resume position inside the sequence-descending operation index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexCursor {
    /// Most recent entry first
    Start,
    /// Entries with a sequence strictly below this one
    Before(u64),
    /// Skip this many entries from the most recent
    Offset(usize),
}
