//! Document-store traits.
//!
//! Implementations include `MemoryStore` and `SqliteStorage` in
//! `logiscan-storage`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::checkpoint::Checkpoint;
use crate::error::IndexerError;
use crate::records::{EventLogRecord, TrackingLeg, TxRecord, WriteSet};
use crate::types::Flavor;

/// Trait for storing and loading checkpoints.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the checkpoint for a flavor.
    async fn load(&self, flavor: Flavor) -> Result<Option<Checkpoint>, IndexerError>;

    /// Save (upsert) a checkpoint.
    async fn save(&self, checkpoint: Checkpoint) -> Result<(), IndexerError>;

    /// Delete a checkpoint (manual reset).
    async fn delete(&self, flavor: Flavor) -> Result<(), IndexerError>;
}

/// Counts of records removed by [`RecordStore::rollback_block`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackReport {
    pub transactions: u64,
    pub legs: u64,
    pub event_logs: u64,
}

impl RollbackReport {
    pub fn total(&self) -> u64 {
        self.transactions + self.legs + self.event_logs
    }

    pub fn merge(&mut self, other: RollbackReport) {
        self.transactions += other.transactions;
        self.legs += other.legs;
        self.event_logs += other.event_logs;
    }
}

/// Filter for [`RecordStore::find_transactions`].
#[derive(Debug, Clone, Default)]
pub struct TxQuery {
    pub block_number: Option<u64>,
    pub tx_type: Option<String>,
    /// Sort by block number descending instead of ascending.
    pub newest_first: bool,
    pub limit: Option<usize>,
}

/// Trait for the derived-record collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Apply every write of one transaction atomically.
    ///
    /// A write set whose transaction hash is already present for the flavor
    /// is skipped as a whole. A leg whose `(order_addr, transport_id)`
    /// already exists is left untouched.
    async fn apply(&self, writes: &WriteSet) -> Result<(), IndexerError>;

    /// Number of derived records (transactions, plus legs for logistics).
    async fn count_derived(&self, flavor: Flavor) -> Result<u64, IndexerError>;

    /// Delete every record of `flavor` tagged with exactly `block_number`.
    async fn rollback_block(
        &self,
        flavor: Flavor,
        block_number: u64,
    ) -> Result<RollbackReport, IndexerError>;

    /// Returns `true` if any tracking leg exists for the order.
    async fn has_legs(&self, order_addr: &str) -> Result<bool, IndexerError>;

    async fn transaction(
        &self,
        flavor: Flavor,
        hash: &str,
    ) -> Result<Option<TxRecord>, IndexerError>;

    async fn find_transactions(
        &self,
        flavor: Flavor,
        query: &TxQuery,
    ) -> Result<Vec<TxRecord>, IndexerError>;

    /// Legs of an order ordered by numeric transport id.
    async fn legs_for_order(&self, order_addr: &str) -> Result<Vec<TrackingLeg>, IndexerError>;

    /// Event logs of a transaction ordered by log index.
    async fn event_logs_for(&self, tx_hash: &str) -> Result<Vec<EventLogRecord>, IndexerError>;
}

/// Convenience bound for a backend that stores both checkpoints and records.
pub trait IndexStore: CheckpointStore + RecordStore {}

impl<T: CheckpointStore + RecordStore> IndexStore for T {}

/// Orders decimal strings numerically without parsing them.
pub fn decimal_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
