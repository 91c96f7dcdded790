// SQLite-backed ledger client.
//
// Production opens the ingestion engine's database with a small pool of
// query-only connections; each query runs on the blocking thread pool so the
// async runtime never waits on disk.

use super::rows::{BalanceRow, DetailRow, IndexCursor, IndexRow, TokenRow};
use super::schema::SCHEMA_STATEMENTS;
use super::LedgerStore;
use crate::errors::{ExplorerError, ExplorerResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BUSY_TIMEOUT_MS: u64 = 30_000;

const BALANCE_COLUMNS: &str = "address, tick, dec, balance, locked, opmod";
const TOKEN_COLUMNS: &str = "tick, meta, minted, opmod, mtsmod";
const INDEX_COLUMNS: &str = "oprange, opscore, txid, state, tickaffc, addressaffc";

pub struct SqliteStore {
    connections: Vec<Arc<Mutex<Connection>>>,
    next: AtomicUsize,
    location: String,
}

impl SqliteStore {
    /// Open an existing ledger with `read_connections` pooled query-only connections.
    ///
    /// Connections are opened read-write at the file level so they can join a
    /// WAL-mode ledger; `query_only` rejects every write statement.
    pub fn open(path: &str, read_connections: usize) -> ExplorerResult<Self> {
        if !Path::new(path).exists() {
            return Err(ExplorerError::storage(
                "open ledger",
                format!("ledger database not found at {}", path),
            ));
        }

        let count = read_connections.max(1);
        let mut connections = Vec::with_capacity(count);
        for _ in 0..count {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .map_err(|e| ExplorerError::storage("open ledger", e))?;
            configure_read_connection(&conn)
                .map_err(|e| ExplorerError::storage("configure ledger connection", e))?;
            connections.push(Arc::new(Mutex::new(conn)));
        }

        logger::info(
            LogTag::Store,
            &format!("Ledger opened query-only at {} ({} connections)", path, count),
        );

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
            location: path.to_string(),
        })
    }

    /// Create (or reuse) a writable ledger file with the full schema.
    ///
    /// Meant for local ledgers; the ingestion engine owns production files.
    pub fn create(path: &str) -> ExplorerResult<Self> {
        let conn = Connection::open(path).map_err(|e| ExplorerError::storage("create ledger", e))?;
        Self::from_writable(conn, path)
    }

    /// Private in-memory ledger with the full schema and a single connection
    pub fn open_in_memory() -> ExplorerResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ExplorerError::storage("create in-memory ledger", e))?;
        Self::from_writable(conn, ":memory:")
    }

    fn from_writable(conn: Connection, location: &str) -> ExplorerResult<Self> {
        configure_write_connection(&conn)
            .map_err(|e| ExplorerError::storage("configure ledger connection", e))?;
        for statement in SCHEMA_STATEMENTS {
            conn.execute(statement, [])
                .map_err(|e| ExplorerError::storage("initialize ledger schema", e))?;
        }

        logger::debug(
            LogTag::Store,
            &format!("Ledger schema initialized at {}", location),
        );

        Ok(Self {
            connections: vec![Arc::new(Mutex::new(conn))],
            next: AtomicUsize::new(0),
            location: location.to_string(),
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Round-robin over the pool
    fn get_connection(&self) -> Arc<Mutex<Connection>> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[index].clone()
    }

    /// Run one query on the blocking pool, mapping driver errors to `StorageUnavailable`
    async fn run<T, F>(&self, operation: &'static str, query: F) -> ExplorerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = self.get_connection();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| {
                ExplorerError::storage(operation, format!("failed to lock connection: {}", e))
            })?;
            query(&conn).map_err(|e| ExplorerError::storage(operation, e))
        })
        .await?
    }

    /// Synchronous write access for seeding local ledgers
    #[cfg(test)]
    pub(crate) fn write<F>(&self, f: F) -> rusqlite::Result<()>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<()>,
    {
        let conn = self.connections[0]
            .lock()
            .map_err(|_| rusqlite::Error::InvalidQuery)?;
        f(&conn)
    }
}

fn configure_read_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
    conn.pragma_update(None, "cache_size", 10000)?;
    conn.pragma_update(None, "temp_store", "memory")?;
    conn.pragma_update(None, "query_only", "ON")?;
    Ok(())
}

fn configure_write_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "cache_size", 10000)?;
    conn.pragma_update(None, "temp_store", "memory")?;
    conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
    Ok(())
}

fn balance_from_row(row: &Row) -> rusqlite::Result<BalanceRow> {
    Ok(BalanceRow {
        address: row.get(0)?,
        tick: row.get(1)?,
        dec: row.get(2)?,
        balance: row.get(3)?,
        locked: row.get(4)?,
        op_mod: row.get(5)?,
    })
}

fn token_from_row(row: &Row) -> rusqlite::Result<TokenRow> {
    Ok(TokenRow {
        tick: row.get(0)?,
        meta: row.get(1)?,
        minted: row.get(2)?,
        op_mod: row.get(3)?,
        mts_mod: row.get(4)?,
    })
}

fn index_from_row(row: &Row) -> rusqlite::Result<IndexRow> {
    Ok(IndexRow {
        op_range: row.get(0)?,
        op_score: row.get(1)?,
        txid: row.get(2)?,
        state: row.get(3)?,
        tick_affc: row.get(4)?,
        address_affc: row.get(5)?,
    })
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn balances_for_address(&self, address: &str) -> ExplorerResult<Vec<BalanceRow>> {
        let address = address.to_string();
        self.run("balances for address", move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM stbalance WHERE address = ?1 ORDER BY tick ASC",
                BALANCE_COLUMNS
            ))?;
            let rows = stmt.query_map(params![address], balance_from_row)?;
            rows.collect()
        })
        .await
    }

    async fn balance_page_for_tick(
        &self,
        tick: &str,
        after_address: Option<&str>,
        limit: usize,
    ) -> ExplorerResult<Vec<BalanceRow>> {
        let tick = tick.to_string();
        let after = after_address.unwrap_or("").to_string();
        let limit = sql_limit(limit);
        self.run("balance page for tick", move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM stbalance WHERE tick = ?1 AND address > ?2 \
                 ORDER BY address ASC LIMIT ?3",
                BALANCE_COLUMNS
            ))?;
            let rows = stmt.query_map(params![tick, after, limit], balance_from_row)?;
            rows.collect()
        })
        .await
    }

    async fn balance_scan_page(
        &self,
        after: Option<(&str, &str)>,
        limit: usize,
    ) -> ExplorerResult<Vec<BalanceRow>> {
        let (after_address, after_tick) = after
            .map(|(address, tick)| (address.to_string(), tick.to_string()))
            .unwrap_or_default();
        let limit = sql_limit(limit);
        self.run("balance scan page", move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM stbalance \
                 WHERE (address > ?1 OR (address = ?1 AND tick > ?2)) \
                   AND NOT (balance IN ('', '0') AND locked IN ('', '0')) \
                 ORDER BY address ASC, tick ASC LIMIT ?3",
                BALANCE_COLUMNS
            ))?;
            let rows = stmt.query_map(params![after_address, after_tick, limit], balance_from_row)?;
            rows.collect()
        })
        .await
    }

    async fn addresses_after(
        &self,
        last_address: Option<&str>,
        limit: usize,
    ) -> ExplorerResult<Vec<String>> {
        let after = last_address.unwrap_or("").to_string();
        let limit = sql_limit(limit);
        self.run("addresses page", move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT address FROM stbalance WHERE address > ?1 \
                 ORDER BY address ASC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![after, limit], |row| row.get(0))?;
            rows.collect()
        })
        .await
    }

    async fn token_row(&self, tick: &str) -> ExplorerResult<Option<TokenRow>> {
        let tick = tick.to_string();
        self.run("token metadata", move |conn| {
            let result = conn.query_row(
                &format!("SELECT {} FROM sttoken WHERE tick = ?1", TOKEN_COLUMNS),
                params![tick],
                token_from_row,
            );
            match result {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn token_rows(&self) -> ExplorerResult<Vec<TokenRow>> {
        self.run("token list", move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM sttoken ORDER BY tick ASC",
                TOKEN_COLUMNS
            ))?;
            let rows = stmt.query_map([], token_from_row)?;
            rows.collect()
        })
        .await
    }

    async fn index_page(
        &self,
        tick: Option<&str>,
        cursor: IndexCursor,
        limit: usize,
    ) -> ExplorerResult<Vec<IndexRow>> {
        let (before, offset) = match cursor {
            IndexCursor::Start => (i64::MAX, 0),
            IndexCursor::Before(score) => (i64::try_from(score).unwrap_or(i64::MAX), 0),
            IndexCursor::Offset(skip) => (i64::MAX, sql_limit(skip)),
        };
        let limit = sql_limit(limit);
        let tick = tick.map(str::to_string);
        self.run("operation index page", move |conn| match tick {
            Some(tick) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM oplist_by_tick WHERE tick = ?1 AND opscore < ?2 \
                     ORDER BY opscore DESC LIMIT ?3 OFFSET ?4",
                    INDEX_COLUMNS
                ))?;
                let rows = stmt.query_map(params![tick, before, limit, offset], index_from_row)?;
                rows.collect()
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM oplist WHERE opscore < ?1 \
                     ORDER BY opscore DESC LIMIT ?2 OFFSET ?3",
                    INDEX_COLUMNS
                ))?;
                let rows = stmt.query_map(params![before, limit, offset], index_from_row)?;
                rows.collect()
            }
        })
        .await
    }

    async fn index_entry_for_txid(&self, txid: &str) -> ExplorerResult<Option<IndexRow>> {
        let txid = txid.to_string();
        self.run("operation index lookup", move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {} FROM oplist WHERE txid = ?1 ORDER BY opscore DESC LIMIT 1",
                    INDEX_COLUMNS
                ),
                params![txid],
                index_from_row,
            );
            match result {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }

    async fn detail(&self, txid: &str) -> ExplorerResult<Option<DetailRow>> {
        let txid = txid.to_string();
        self.run("operation detail", move |conn| {
            let result = conn.query_row(
                "SELECT txid, state, script, checkpoint FROM opdata WHERE txid = ?1",
                params![txid],
                |row| {
                    Ok(DetailRow {
                        txid: row.get(0)?,
                        state: row.get(1)?,
                        script: row.get(2)?,
                        checkpoint: row.get(3)?,
                    })
                },
            );
            match result {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed::LedgerSeeder;

    #[tokio::test]
    async fn test_balance_pages_follow_address_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        let seeder = LedgerSeeder::new(&store);
        for address in ["kaspa:c", "kaspa:a", "kaspa:b"] {
            seeder.balance(address, "KASP", "10", "0");
        }
        seeder.balance("kaspa:a", "NACHO", "5", "0");

        let first = store.balance_page_for_tick("KASP", None, 2).await.unwrap();
        let addresses: Vec<_> = first.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["kaspa:a", "kaspa:b"]);

        let rest = store
            .balance_page_for_tick("KASP", Some("kaspa:b"), 2)
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].address, "kaspa:c");

        let portfolio = store.balances_for_address("kaspa:a").await.unwrap();
        let ticks: Vec<_> = portfolio.iter().map(|r| r.tick.as_str()).collect();
        assert_eq!(ticks, vec!["KASP", "NACHO"]);
    }

    #[tokio::test]
    async fn test_scan_skips_zero_rows_and_resumes_after_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        let seeder = LedgerSeeder::new(&store);
        seeder.balance("kaspa:a", "KASP", "10", "0");
        seeder.balance("kaspa:a", "NACHO", "0", "");
        seeder.balance("kaspa:a", "ZEAL", "1", "0");
        seeder.balance("kaspa:b", "KASP", "", "3");

        let page = store.balance_scan_page(None, 2).await.unwrap();
        let keys: Vec<_> = page
            .iter()
            .map(|r| (r.address.as_str(), r.tick.as_str()))
            .collect();
        assert_eq!(keys, vec![("kaspa:a", "KASP"), ("kaspa:a", "ZEAL")]);

        let next = store
            .balance_scan_page(Some(("kaspa:a", "ZEAL")), 2)
            .await
            .unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].address, "kaspa:b");
    }

    #[tokio::test]
    async fn test_index_page_cursors() {
        let store = SqliteStore::open_in_memory().unwrap();
        let seeder = LedgerSeeder::new(&store);
        for (score, tick) in [(10, "KASP"), (20, "NACHO"), (30, "KASP"), (40, "KASP")] {
            seeder.operation(score, &format!("tx{}", score), tick, "transfer");
        }

        let latest = store.index_page(None, IndexCursor::Start, 2).await.unwrap();
        let scores: Vec<_> = latest.iter().map(|r| r.op_score).collect();
        assert_eq!(scores, vec![40, 30]);

        let older = store
            .index_page(None, IndexCursor::Before(30), 10)
            .await
            .unwrap();
        let scores: Vec<_> = older.iter().map(|r| r.op_score).collect();
        assert_eq!(scores, vec![20, 10]);

        let kasp = store
            .index_page(Some("KASP"), IndexCursor::Offset(1), 10)
            .await
            .unwrap();
        let scores: Vec<_> = kasp.iter().map(|r| r.op_score).collect();
        assert_eq!(scores, vec![30, 10]);
    }

    #[tokio::test]
    async fn test_point_lookups() {
        let store = SqliteStore::open_in_memory().unwrap();
        let seeder = LedgerSeeder::new(&store);
        seeder.token("KASP", "1000");
        seeder.operation(7, "abc", "KASP", "mint");

        assert!(store.token_row("KASP").await.unwrap().is_some());
        assert!(store.token_row("NONE").await.unwrap().is_none());
        assert_eq!(
            store.index_entry_for_txid("abc").await.unwrap().unwrap().op_score,
            7
        );
        assert!(store.detail("abc").await.unwrap().is_some());
        assert!(store.detail("zzz").await.unwrap().is_none());
        assert_eq!(store.addresses_after(None, 10).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_read_only_pool_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        let path = path.to_str().unwrap();
        {
            let writer = SqliteStore::create(path).unwrap();
            let seeder = LedgerSeeder::new(&writer);
            seeder.balance("kaspa:a", "KASP", "1", "0");
            seeder.balance("kaspa:b", "KASP", "2", "0");
        }

        let reader = SqliteStore::open(path, 3).unwrap();
        assert_eq!(reader.connection_count(), 3);
        for _ in 0..4 {
            let addresses = reader.addresses_after(None, 10).await.unwrap();
            assert_eq!(addresses, vec!["kaspa:a", "kaspa:b"]);
        }
    }

    #[test]
    fn test_open_missing_file_is_storage_error() {
        let err = SqliteStore::open("/nonexistent/ledger.db", 2).err().unwrap();
        assert!(err.is_retryable());
    }
}
