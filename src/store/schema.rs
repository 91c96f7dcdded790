// Ledger schema as written by the ingestion engine.
// The query core never runs these against a production ledger; they exist so
// a local or test ledger can be created with the same layout.

/// Sequence numbers per `oplist` partition bucket
pub const OP_RANGE_SIZE: u64 = 100_000;

pub fn op_range_for(op_score: u64) -> i64 {
    (op_score / OP_RANGE_SIZE) as i64
}

/// SQL statements to initialize the ledger schema
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // Token metadata, one row per tick
    r#"
    CREATE TABLE IF NOT EXISTS sttoken (
        tick TEXT PRIMARY KEY,
        meta TEXT NOT NULL,
        minted TEXT NOT NULL DEFAULT '',
        opmod INTEGER NOT NULL DEFAULT 0,
        mtsmod INTEGER NOT NULL DEFAULT 0
    )
    "#,
    // Balances, one row per (address, tick)
    r#"
    CREATE TABLE IF NOT EXISTS stbalance (
        address TEXT NOT NULL,
        tick TEXT NOT NULL,
        dec INTEGER NOT NULL DEFAULT 0,
        balance TEXT NOT NULL DEFAULT '',
        locked TEXT NOT NULL DEFAULT '',
        opmod INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (address, tick)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_stbalance_tick ON stbalance(tick, address)
    "#,
    // Narrow operation index ordered by sequence
    r#"
    CREATE TABLE IF NOT EXISTS oplist (
        oprange INTEGER NOT NULL,
        opscore INTEGER NOT NULL,
        txid TEXT NOT NULL,
        state TEXT NOT NULL DEFAULT '',
        script TEXT NOT NULL DEFAULT '',
        tickaffc TEXT NOT NULL DEFAULT '',
        addressaffc TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (oprange, opscore)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_oplist_opscore ON oplist(opscore DESC)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_oplist_txid ON oplist(txid)
    "#,
    // Tick-keyed projection of oplist, one row per affected tick
    r#"
    CREATE TABLE IF NOT EXISTS oplist_by_tick (
        tick TEXT NOT NULL,
        opscore INTEGER NOT NULL,
        oprange INTEGER NOT NULL,
        txid TEXT NOT NULL,
        state TEXT NOT NULL DEFAULT '',
        tickaffc TEXT NOT NULL DEFAULT '',
        addressaffc TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (tick, opscore)
    )
    "#,
    // Wide operation detail keyed by transaction id
    r#"
    CREATE TABLE IF NOT EXISTS opdata (
        txid TEXT PRIMARY KEY,
        state TEXT NOT NULL DEFAULT '',
        script TEXT NOT NULL DEFAULT '',
        stbefore TEXT NOT NULL DEFAULT '',
        stafter TEXT NOT NULL DEFAULT '',
        checkpoint TEXT
    )
    "#,
];
