// Test-only writer that lays out ledger rows the way the ingestion engine does.

use super::schema::op_range_for;
use super::sqlite::SqliteStore;
use rusqlite::params;

pub struct LedgerSeeder<'a> {
    store: &'a SqliteStore,
}

impl<'a> LedgerSeeder<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Deployed token with only `max` set
    pub fn token(&self, tick: &str, max: &str) {
        let meta = format!(
            r#"{{"max":"{}","lim":"1000","pre":"0","dec":8,"from":"kaspa:deployer","txid":"deploy-{}","opadd":1,"mtsadd":1700000000000}}"#,
            max, tick
        );
        self.token_meta(tick, &meta, "0");
    }

    /// Token row with an arbitrary meta blob
    pub fn token_meta(&self, tick: &str, meta: &str, minted: &str) {
        self.store
            .write(|conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO sttoken (tick, meta, minted, opmod, mtsmod) \
                     VALUES (?1, ?2, ?3, 1, 1700000000000)",
                    params![tick, meta, minted],
                )?;
                Ok(())
            })
            .expect("seed token");
    }

    pub fn balance(&self, address: &str, tick: &str, balance: &str, locked: &str) {
        self.store
            .write(|conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO stbalance (address, tick, dec, balance, locked, opmod) \
                     VALUES (?1, ?2, 8, ?3, ?4, 1)",
                    params![address, tick, balance, locked],
                )?;
                Ok(())
            })
            .expect("seed balance");
    }

    /// Index entry plus detail row for a simple single-tick operation
    pub fn operation(&self, score: u64, txid: &str, tick: &str, op: &str) {
        let script = format!(
            r#"{{"p":"krc-20","op":"{}","tick":"{}","amt":"100","from":"kaspa:from","to":"kaspa:to"}}"#,
            op, tick
        );
        let state = format!(
            r#"{{"blockaccept":"block-{}","fee":1000,"feeleast":500,"mtsadd":1700000000000,"opscore":{},"opaccept":1,"operror":"","checkpoint":"cp-{}"}}"#,
            score, score, score
        );
        self.index_entry(score, txid, tick);
        self.detail(txid, &script, &state);
    }

    /// Index rows only, as left behind when the detail write has not landed
    pub fn index_entry(&self, score: u64, txid: &str, tick: &str) {
        let range = op_range_for(score);
        let score = score as i64;
        let tick_affc = format!("{}=1", tick);
        let address_affc = "kaspa:from,kaspa:to";
        self.store
            .write(|conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO oplist \
                     (oprange, opscore, txid, state, script, tickaffc, addressaffc) \
                     VALUES (?1, ?2, ?3, 'accepted', '', ?4, ?5)",
                    params![range, score, txid, tick_affc, address_affc],
                )?;
                conn.execute(
                    "INSERT OR REPLACE INTO oplist_by_tick \
                     (tick, opscore, oprange, txid, state, tickaffc, addressaffc) \
                     VALUES (?1, ?2, ?3, ?4, 'accepted', ?5, ?6)",
                    params![tick, score, range, txid, tick_affc, address_affc],
                )?;
                Ok(())
            })
            .expect("seed index entry");
    }

    pub fn detail(&self, txid: &str, script: &str, state: &str) {
        self.store
            .write(|conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO opdata (txid, state, script, stbefore, stafter, checkpoint) \
                     VALUES (?1, ?2, ?3, '', '', NULL)",
                    params![txid, state, script],
                )?;
                Ok(())
            })
            .expect("seed detail");
    }
}
