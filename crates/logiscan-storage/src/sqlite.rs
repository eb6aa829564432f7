//! SQLite storage backend for Logiscan.
//!
//! Persists checkpoints, transaction records, tracking legs and event logs to
//! a single SQLite file. Uses `sqlx` with WAL mode. Each write set is applied
//! inside one database transaction.
//!
//! # Usage
//! ```rust,no_run
//! use logiscan_storage::sqlite::SqliteStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // File-backed (persistent)
//! let store = SqliteStorage::open("./logiscan.db").await?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteStorage::in_memory().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use logiscan_core::checkpoint::Checkpoint;
use logiscan_core::error::IndexerError;
use logiscan_core::records::{EventLogRecord, EventParamSlot, TrackingLeg, TxRecord, WriteSet};
use logiscan_core::records::MAX_EVENT_PARAMS;
use logiscan_core::store::{decimal_cmp, CheckpointStore, RecordStore, RollbackReport, TxQuery};
use logiscan_core::types::Flavor;

fn storage_err(e: impl std::fmt::Display) -> IndexerError {
    IndexerError::Storage(e.to_string())
}

/// SQLite-backed storage for checkpoints and derived records.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (or create) a SQLite database at `path`.
    ///
    /// The path may be a plain file path (`"./logiscan.db"`) or a full
    /// SQLite URL (`"sqlite:./logiscan.db?mode=rwc"`).
    pub async fn open(path: &str) -> Result<Self, IndexerError> {
        let url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{path}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url).await.map_err(storage_err)?;

        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Every pooled connection to `sqlite::memory:` is a separate database,
    /// so the pool is held to a single connection.
    pub async fn in_memory() -> Result<Self, IndexerError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_err)?;

        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create tables and enable WAL mode.
    async fn init_schema(&self) -> Result<(), IndexerError> {
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS checkpoints (
                flavor       TEXT    NOT NULL PRIMARY KEY,
                block_number INTEGER NOT NULL,
                updated_at   INTEGER NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        // The full record is kept as JSON; the filter columns are copies.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS transactions (
                flavor       TEXT    NOT NULL,
                hash         TEXT    NOT NULL,
                block_number INTEGER NOT NULL,
                tx_type      TEXT    NOT NULL,
                category     TEXT    NOT NULL,
                doc          TEXT    NOT NULL,
                PRIMARY KEY (flavor, hash)
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tracking_legs (
                order_addr   TEXT    NOT NULL,
                transport_id TEXT    NOT NULL,
                order_id     TEXT    NOT NULL,
                company_addr TEXT    NOT NULL,
                company_name TEXT,
                code         TEXT    NOT NULL,
                incentives   TEXT    NOT NULL,
                block_number INTEGER NOT NULL,
                tx_hash      TEXT,
                PRIMARY KEY (order_addr, transport_id)
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS event_logs (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                flavor        TEXT    NOT NULL,
                tx_hash       TEXT    NOT NULL,
                block_number  INTEGER NOT NULL,
                log_index     INTEGER NOT NULL,
                event_name    TEXT    NOT NULL,
                param_count   INTEGER NOT NULL,
                param_name01  TEXT, param_type01 TEXT, param_data01 TEXT,
                param_name02  TEXT, param_type02 TEXT, param_data02 TEXT,
                param_name03  TEXT, param_type03 TEXT, param_data03 TEXT,
                param_name04  TEXT, param_type04 TEXT, param_data04 TEXT
            );",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_tx_block ON transactions (flavor, block_number);",
            "CREATE INDEX IF NOT EXISTS idx_legs_block ON tracking_legs (block_number);",
            "CREATE INDEX IF NOT EXISTS idx_legs_code ON tracking_legs (order_addr, code);",
            "CREATE INDEX IF NOT EXISTS idx_logs_tx ON event_logs (tx_hash);",
            "CREATE INDEX IF NOT EXISTS idx_logs_block ON event_logs (flavor, block_number);",
        ] {
            sqlx::query(index)
                .execute(&self.pool)
                .await
                .map_err(storage_err)?;
        }

        Ok(())
    }

    /// Number of stored event logs of a flavor.
    pub async fn event_log_count(&self, flavor: Flavor) -> Result<u64, IndexerError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM event_logs WHERE flavor = ?")
            .bind(flavor.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.get::<i64, _>("cnt") as u64)
    }

    async fn count(&self, sql: &str, flavor: Option<Flavor>) -> Result<u64, IndexerError> {
        let mut query = sqlx::query(sql);
        if let Some(flavor) = flavor {
            query = query.bind(flavor.as_str());
        }
        let row = query.fetch_one(&self.pool).await.map_err(storage_err)?;
        Ok(row.get::<i64, _>("cnt") as u64)
    }
}

fn leg_from_row(row: &SqliteRow) -> TrackingLeg {
    TrackingLeg {
        order_addr: row.get("order_addr"),
        order_id: row.get("order_id"),
        transport_id: row.get("transport_id"),
        company_addr: row.get("company_addr"),
        company_name: row.get("company_name"),
        code: row.get("code"),
        incentives: row.get("incentives"),
        block_number: row.get::<i64, _>("block_number") as u64,
        tx_hash: row.get("tx_hash"),
    }
}

fn event_log_from_row(row: &SqliteRow) -> EventLogRecord {
    let mut params = Vec::with_capacity(MAX_EVENT_PARAMS);
    for slot in 1..=MAX_EVENT_PARAMS {
        let name: Option<String> = row.get(format!("param_name{slot:02}").as_str());
        let Some(name) = name else {
            break;
        };
        params.push(EventParamSlot {
            name,
            ty: row
                .get::<Option<String>, _>(format!("param_type{slot:02}").as_str())
                .unwrap_or_default(),
            data: row
                .get::<Option<String>, _>(format!("param_data{slot:02}").as_str())
                .unwrap_or_default(),
        });
    }
    EventLogRecord {
        tx_hash: row.get("tx_hash"),
        block_number: row.get::<i64, _>("block_number") as u64,
        log_index: row.get::<i64, _>("log_index") as u64,
        event_name: row.get("event_name"),
        param_count: row.get::<i64, _>("param_count") as usize,
        params,
    }
}

fn tx_from_doc(doc: &str) -> Result<TxRecord, IndexerError> {
    serde_json::from_str(doc).map_err(storage_err)
}

// ─── CheckpointStore impl ────────────────────────────────────────────────────

#[async_trait]
impl CheckpointStore for SqliteStorage {
    async fn load(&self, flavor: Flavor) -> Result<Option<Checkpoint>, IndexerError> {
        let row = sqlx::query(
            "SELECT block_number, updated_at FROM checkpoints WHERE flavor = ?",
        )
        .bind(flavor.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(|r| Checkpoint {
            flavor,
            block_number: r.get::<i64, _>("block_number") as u64,
            updated_at: r.get("updated_at"),
        }))
    }

    async fn save(&self, checkpoint: Checkpoint) -> Result<(), IndexerError> {
        sqlx::query(
            "INSERT OR REPLACE INTO checkpoints (flavor, block_number, updated_at)
             VALUES (?, ?, ?)",
        )
        .bind(checkpoint.flavor.as_str())
        .bind(checkpoint.block_number as i64)
        .bind(checkpoint.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        debug!(flavor = %checkpoint.flavor, block = checkpoint.block_number, "checkpoint saved");
        Ok(())
    }

    async fn delete(&self, flavor: Flavor) -> Result<(), IndexerError> {
        sqlx::query("DELETE FROM checkpoints WHERE flavor = ?")
            .bind(flavor.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

#[async_trait]
impl RecordStore for SqliteStorage {
    async fn apply(&self, writes: &WriteSet) -> Result<(), IndexerError> {
        let flavor = writes.flavor().as_str();
        let record = &writes.transaction;
        let doc = serde_json::to_string(record).map_err(storage_err)?;

        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO transactions
             (flavor, hash, block_number, tx_type, category, doc)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(flavor)
        .bind(record.hash())
        .bind(record.block_number() as i64)
        .bind(record.tx_type())
        .bind(record.category().as_str())
        .bind(&doc)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await.map_err(storage_err)?;
            debug!(tx = %record.hash(), "transaction already stored");
            return Ok(());
        }

        for leg in &writes.new_legs {
            sqlx::query(
                "INSERT OR IGNORE INTO tracking_legs
                 (order_addr, transport_id, order_id, company_addr, company_name,
                  code, incentives, block_number, tx_hash)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&leg.order_addr)
            .bind(&leg.transport_id)
            .bind(&leg.order_id)
            .bind(&leg.company_addr)
            .bind(&leg.company_name)
            .bind(&leg.code)
            .bind(&leg.incentives)
            .bind(leg.block_number as i64)
            .bind(&leg.tx_hash)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        }

        for update in &writes.leg_updates {
            sqlx::query("UPDATE tracking_legs SET tx_hash = ? WHERE order_addr = ? AND code = ?")
                .bind(&update.tx_hash)
                .bind(&update.order_addr)
                .bind(&update.code)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        for log in &writes.event_logs {
            let slot = |i: usize| log.params.get(i);
            let mut query = sqlx::query(
                "INSERT INTO event_logs
                 (flavor, tx_hash, block_number, log_index, event_name, param_count,
                  param_name01, param_type01, param_data01,
                  param_name02, param_type02, param_data02,
                  param_name03, param_type03, param_data03,
                  param_name04, param_type04, param_data04)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(flavor)
            .bind(&log.tx_hash)
            .bind(log.block_number as i64)
            .bind(log.log_index as i64)
            .bind(&log.event_name)
            .bind(log.param_count as i64);
            for i in 0..MAX_EVENT_PARAMS {
                query = query
                    .bind(slot(i).map(|p| p.name.clone()))
                    .bind(slot(i).map(|p| p.ty.clone()))
                    .bind(slot(i).map(|p| p.data.clone()));
            }
            query.execute(&mut *tx).await.map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        debug!(
            tx = %record.hash(),
            block = record.block_number(),
            legs = writes.new_legs.len(),
            event_logs = writes.event_logs.len(),
            "write set applied"
        );
        Ok(())
    }

    async fn count_derived(&self, flavor: Flavor) -> Result<u64, IndexerError> {
        let txs = self
            .count("SELECT COUNT(*) AS cnt FROM transactions WHERE flavor = ?", Some(flavor))
            .await?;
        let legs = match flavor {
            Flavor::Logistics => self.count("SELECT COUNT(*) AS cnt FROM tracking_legs", None).await?,
            Flavor::Token => 0,
        };
        Ok(txs + legs)
    }

    async fn rollback_block(
        &self,
        flavor: Flavor,
        block_number: u64,
    ) -> Result<RollbackReport, IndexerError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let mut report = RollbackReport::default();

        report.transactions = sqlx::query(
            "DELETE FROM transactions WHERE flavor = ? AND block_number = ?",
        )
        .bind(flavor.as_str())
        .bind(block_number as i64)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?
        .rows_affected();

        if flavor == Flavor::Logistics {
            report.legs = sqlx::query("DELETE FROM tracking_legs WHERE block_number = ?")
                .bind(block_number as i64)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?
                .rows_affected();
        }

        report.event_logs = sqlx::query(
            "DELETE FROM event_logs WHERE flavor = ? AND block_number = ?",
        )
        .bind(flavor.as_str())
        .bind(block_number as i64)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?
        .rows_affected();

        tx.commit().await.map_err(storage_err)?;
        debug!(flavor = %flavor, block = block_number, removed = report.total(), "block rolled back");
        Ok(report)
    }

    async fn has_legs(&self, order_addr: &str) -> Result<bool, IndexerError> {
        let row = sqlx::query("SELECT 1 FROM tracking_legs WHERE order_addr = ? LIMIT 1")
            .bind(order_addr)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.is_some())
    }

    async fn transaction(
        &self,
        flavor: Flavor,
        hash: &str,
    ) -> Result<Option<TxRecord>, IndexerError> {
        let row = sqlx::query("SELECT doc FROM transactions WHERE flavor = ? AND hash = ?")
            .bind(flavor.as_str())
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        row.map(|r| tx_from_doc(&r.get::<String, _>("doc"))).transpose()
    }

    async fn find_transactions(
        &self,
        flavor: Flavor,
        query: &TxQuery,
    ) -> Result<Vec<TxRecord>, IndexerError> {
        let mut sql = String::from("SELECT doc FROM transactions WHERE flavor = ?");
        if query.block_number.is_some() {
            sql.push_str(" AND block_number = ?");
        }
        if query.tx_type.is_some() {
            sql.push_str(" AND tx_type = ?");
        }
        sql.push_str(if query.newest_first {
            " ORDER BY block_number DESC, rowid DESC"
        } else {
            " ORDER BY block_number ASC, rowid ASC"
        });
        if query.limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut q = sqlx::query(&sql).bind(flavor.as_str());
        if let Some(n) = query.block_number {
            q = q.bind(n as i64);
        }
        if let Some(ty) = &query.tx_type {
            q = q.bind(ty.as_str());
        }
        if let Some(limit) = query.limit {
            q = q.bind(limit as i64);
        }

        let rows = q.fetch_all(&self.pool).await.map_err(storage_err)?;
        rows.iter()
            .map(|r| tx_from_doc(&r.get::<String, _>("doc")))
            .collect()
    }

    async fn legs_for_order(&self, order_addr: &str) -> Result<Vec<TrackingLeg>, IndexerError> {
        let rows = sqlx::query("SELECT * FROM tracking_legs WHERE order_addr = ?")
            .bind(order_addr)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        let mut legs: Vec<TrackingLeg> = rows.iter().map(leg_from_row).collect();
        legs.sort_by(|a, b| decimal_cmp(&a.transport_id, &b.transport_id));
        Ok(legs)
    }

    async fn event_logs_for(&self, tx_hash: &str) -> Result<Vec<EventLogRecord>, IndexerError> {
        let rows = sqlx::query("SELECT * FROM event_logs WHERE tx_hash = ? ORDER BY log_index, id")
            .bind(tx_hash)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(rows.iter().map(event_log_from_row).collect())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use logiscan_core::records::{
        LegTxHashUpdate, LogisticsTx, LogisticsTxType, TokenTx, TokenTxType, TxCommon,
    };

    const ORDER: &str = "0x00000000000000000000000000000000000000d1";

    fn common(hash: &str, block: u64) -> TxCommon {
        TxCommon {
            hash: hash.into(),
            block_number: block,
            status: true,
            value: "0".into(),
            tx_fee: "0.0000".into(),
            ..Default::default()
        }
    }

    fn leg(transport_id: u64, code: &str, block: u64) -> TrackingLeg {
        TrackingLeg {
            order_addr: ORDER.into(),
            order_id: "42".into(),
            transport_id: transport_id.to_string(),
            company_addr: "0x00000000000000000000000000000000000000c1".into(),
            company_name: (transport_id > 0).then(|| "Acme".to_string()),
            code: code.into(),
            incentives: "5".into(),
            block_number: block,
            tx_hash: None,
        }
    }

    fn wide_log(tx_hash: &str, block: u64) -> EventLogRecord {
        let params = (0..6)
            .map(|i| EventParamSlot {
                name: format!("p{i}"),
                ty: "uint256".into(),
                data: i.to_string(),
            })
            .collect();
        EventLogRecord::new(tx_hash, block, 2, "Wide", params)
    }

    // ── CheckpointStore ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn checkpoint_upsert() {
        let store = SqliteStorage::in_memory().await.unwrap();
        store
            .save(Checkpoint {
                flavor: Flavor::Logistics,
                block_number: 100,
                updated_at: 0,
            })
            .await
            .unwrap();
        store
            .save(Checkpoint {
                flavor: Flavor::Logistics,
                block_number: 200,
                updated_at: 1,
            })
            .await
            .unwrap();

        let loaded = store.load(Flavor::Logistics).await.unwrap().unwrap();
        assert_eq!(loaded.block_number, 200);
        assert_eq!(loaded.updated_at, 1);
        assert!(store.load(Flavor::Token).await.unwrap().is_none());

        store.delete(Flavor::Logistics).await.unwrap();
        assert!(store.load(Flavor::Logistics).await.unwrap().is_none());
    }

    // ── RecordStore ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn transaction_doc_roundtrip() {
        let store = SqliteStorage::in_memory().await.unwrap();
        let mut launch = LogisticsTx::new(common("0xaa", 9), LogisticsTxType::OrderLaunch);
        launch.order_addr = Some(ORDER.into());
        launch.transport_id = Some("3".into());
        let record = TxRecord::Logistics(launch);
        store.apply(&WriteSet::new(record.clone())).await.unwrap();

        let loaded = store.transaction(Flavor::Logistics, "0xaa").await.unwrap();
        assert_eq!(loaded, Some(record));
        assert!(store.transaction(Flavor::Token, "0xaa").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_write_set_is_ignored() {
        let store = SqliteStorage::in_memory().await.unwrap();
        let record = TxRecord::Token(TokenTx::new(common("0xbb", 4), TokenTxType::Transfer));
        let writes = WriteSet::new(record).with_event_logs(vec![wide_log("0xbb", 4)]);
        store.apply(&writes).await.unwrap();
        store.apply(&writes).await.unwrap();

        assert_eq!(store.count_derived(Flavor::Token).await.unwrap(), 1);
        assert_eq!(store.event_log_count(Flavor::Token).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn event_log_slots_are_capped() {
        let store = SqliteStorage::in_memory().await.unwrap();
        let record = TxRecord::Token(TokenTx::new(common("0xcc", 4), TokenTxType::Approve));
        store
            .apply(&WriteSet::new(record).with_event_logs(vec![wide_log("0xcc", 4)]))
            .await
            .unwrap();

        let logs = store.event_logs_for("0xcc").await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].param_count, 6);
        assert_eq!(logs[0].params.len(), MAX_EVENT_PARAMS);
        assert_eq!(logs[0].params[3].name, "p3");
        assert_eq!(logs[0], wide_log("0xcc", 4));
    }

    #[tokio::test]
    async fn legs_unique_and_backfilled() {
        let store = SqliteStorage::in_memory().await.unwrap();
        let mut deploy =
            WriteSet::new(TxRecord::Logistics(LogisticsTx::new(common("0x01", 3), LogisticsTxType::Deploy)));
        deploy.new_legs = (0..11).map(|i| leg(i, &format!("{}", 100 + i), 3)).collect();
        store.apply(&deploy).await.unwrap();

        let mut submit =
            WriteSet::new(TxRecord::Logistics(LogisticsTx::new(common("0x02", 4), LogisticsTxType::Submit)));
        submit.new_legs = vec![leg(0, "999", 4)];
        store.apply(&submit).await.unwrap();

        let mut update = WriteSet::new(TxRecord::Logistics(LogisticsTx::new(
            common("0x03", 5),
            LogisticsTxType::OrderUpdate,
        )));
        update.leg_updates = vec![LegTxHashUpdate {
            order_addr: ORDER.into(),
            code: "102".into(),
            tx_hash: "0x03".into(),
        }];
        store.apply(&update).await.unwrap();

        let legs = store.legs_for_order(ORDER).await.unwrap();
        assert_eq!(legs.len(), 11);
        assert_eq!(legs[0].code, "100");
        assert_eq!(legs[0].company_name, None);
        assert_eq!(legs[1].company_name.as_deref(), Some("Acme"));
        assert_eq!(legs[10].transport_id, "10");
        assert_eq!(legs[2].tx_hash.as_deref(), Some("0x03"));
        assert!(store.has_legs(ORDER).await.unwrap());
        assert_eq!(store.count_derived(Flavor::Logistics).await.unwrap(), 3 + 11);
    }

    #[tokio::test]
    async fn rollback_block_and_find() {
        let store = SqliteStorage::in_memory().await.unwrap();
        let mut at_7 =
            WriteSet::new(TxRecord::Logistics(LogisticsTx::new(common("0x07", 7), LogisticsTxType::Deploy)))
                .with_event_logs(vec![wide_log("0x07", 7)]);
        at_7.new_legs = vec![leg(0, "1", 7), leg(1, "2", 7)];
        store.apply(&at_7).await.unwrap();
        store
            .apply(&WriteSet::new(TxRecord::Logistics(LogisticsTx::new(
                common("0x06", 6),
                LogisticsTxType::Register,
            ))))
            .await
            .unwrap();

        let newest = store
            .find_transactions(
                Flavor::Logistics,
                &TxQuery {
                    newest_first: true,
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(newest[0].hash(), "0x07");

        let report = store.rollback_block(Flavor::Logistics, 7).await.unwrap();
        assert_eq!(report, RollbackReport { transactions: 1, legs: 2, event_logs: 1 });
        assert_eq!(store.count_derived(Flavor::Logistics).await.unwrap(), 1);

        let registers = store
            .find_transactions(
                Flavor::Logistics,
                &TxQuery {
                    tx_type: Some("REGISTER".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(registers.len(), 1);
    }
}
