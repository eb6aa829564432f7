//! In-memory storage backend.
//!
//! Everything lives behind one mutex so a write set is applied atomically.
//! All data is lost when the process exits.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use logiscan_core::checkpoint::Checkpoint;
use logiscan_core::error::IndexerError;
use logiscan_core::records::{EventLogRecord, TrackingLeg, TxRecord, WriteSet};
use logiscan_core::store::{decimal_cmp, CheckpointStore, RecordStore, RollbackReport, TxQuery};
use logiscan_core::types::Flavor;

#[derive(Default)]
struct State {
    checkpoints: HashMap<Flavor, Checkpoint>,
    /// Insertion order is block order.
    transactions: Vec<TxRecord>,
    legs: Vec<TrackingLeg>,
    event_logs: Vec<(Flavor, EventLogRecord)>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Total number of stored event logs across flavors.
    pub fn event_log_count(&self) -> usize {
        self.state().event_logs.len()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn load(&self, flavor: Flavor) -> Result<Option<Checkpoint>, IndexerError> {
        Ok(self.state().checkpoints.get(&flavor).cloned())
    }

    async fn save(&self, checkpoint: Checkpoint) -> Result<(), IndexerError> {
        self.state().checkpoints.insert(checkpoint.flavor, checkpoint);
        Ok(())
    }

    async fn delete(&self, flavor: Flavor) -> Result<(), IndexerError> {
        self.state().checkpoints.remove(&flavor);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn apply(&self, writes: &WriteSet) -> Result<(), IndexerError> {
        let flavor = writes.flavor();
        let mut state = self.state();

        let duplicate = state
            .transactions
            .iter()
            .any(|tx| tx.flavor() == flavor && tx.hash() == writes.transaction.hash());
        if duplicate {
            tracing::debug!(tx = %writes.transaction.hash(), "transaction already stored");
            return Ok(());
        }
        state.transactions.push(writes.transaction.clone());

        for leg in &writes.new_legs {
            let exists = state
                .legs
                .iter()
                .any(|l| l.order_addr == leg.order_addr && l.transport_id == leg.transport_id);
            if !exists {
                state.legs.push(leg.clone());
            }
        }

        for update in &writes.leg_updates {
            for leg in state
                .legs
                .iter_mut()
                .filter(|l| l.order_addr == update.order_addr && l.code == update.code)
            {
                leg.tx_hash = Some(update.tx_hash.clone());
            }
        }

        state
            .event_logs
            .extend(writes.event_logs.iter().map(|log| (flavor, log.clone())));
        Ok(())
    }

    async fn count_derived(&self, flavor: Flavor) -> Result<u64, IndexerError> {
        let state = self.state();
        let txs = state.transactions.iter().filter(|tx| tx.flavor() == flavor).count();
        let legs = match flavor {
            Flavor::Logistics => state.legs.len(),
            Flavor::Token => 0,
        };
        Ok((txs + legs) as u64)
    }

    async fn rollback_block(
        &self,
        flavor: Flavor,
        block_number: u64,
    ) -> Result<RollbackReport, IndexerError> {
        let mut state = self.state();
        let mut report = RollbackReport::default();

        let before = state.transactions.len();
        state
            .transactions
            .retain(|tx| !(tx.flavor() == flavor && tx.block_number() == block_number));
        report.transactions = (before - state.transactions.len()) as u64;

        if flavor == Flavor::Logistics {
            let before = state.legs.len();
            state.legs.retain(|leg| leg.block_number != block_number);
            report.legs = (before - state.legs.len()) as u64;
        }

        let before = state.event_logs.len();
        state
            .event_logs
            .retain(|(f, log)| !(*f == flavor && log.block_number == block_number));
        report.event_logs = (before - state.event_logs.len()) as u64;

        Ok(report)
    }

    async fn has_legs(&self, order_addr: &str) -> Result<bool, IndexerError> {
        Ok(self.state().legs.iter().any(|l| l.order_addr == order_addr))
    }

    async fn transaction(
        &self,
        flavor: Flavor,
        hash: &str,
    ) -> Result<Option<TxRecord>, IndexerError> {
        Ok(self
            .state()
            .transactions
            .iter()
            .find(|tx| tx.flavor() == flavor && tx.hash() == hash)
            .cloned())
    }

    async fn find_transactions(
        &self,
        flavor: Flavor,
        query: &TxQuery,
    ) -> Result<Vec<TxRecord>, IndexerError> {
        let mut found: Vec<TxRecord> = self
            .state()
            .transactions
            .iter()
            .filter(|tx| tx.flavor() == flavor)
            .filter(|tx| query.block_number.map_or(true, |n| tx.block_number() == n))
            .filter(|tx| query.tx_type.as_deref().map_or(true, |t| tx.tx_type() == t))
            .cloned()
            .collect();
        found.sort_by_key(|tx| tx.block_number());
        if query.newest_first {
            found.reverse();
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn legs_for_order(&self, order_addr: &str) -> Result<Vec<TrackingLeg>, IndexerError> {
        let mut legs: Vec<TrackingLeg> = self
            .state()
            .legs
            .iter()
            .filter(|l| l.order_addr == order_addr)
            .cloned()
            .collect();
        legs.sort_by(|a, b| decimal_cmp(&a.transport_id, &b.transport_id));
        Ok(legs)
    }

    async fn event_logs_for(&self, tx_hash: &str) -> Result<Vec<EventLogRecord>, IndexerError> {
        let mut logs: Vec<EventLogRecord> = self
            .state()
            .event_logs
            .iter()
            .filter(|(_, log)| log.tx_hash == tx_hash)
            .map(|(_, log)| log.clone())
            .collect();
        logs.sort_by_key(|log| log.log_index);
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logiscan_core::records::{
        EventParamSlot, LegTxHashUpdate, LogisticsTx, LogisticsTxType, TokenTx, TokenTxType,
        TxCommon,
    };

    const ORDER: &str = "0x00000000000000000000000000000000000000d1";

    fn logistics(hash: &str, block: u64, ty: LogisticsTxType) -> TxRecord {
        TxRecord::Logistics(LogisticsTx::new(
            TxCommon {
                hash: hash.into(),
                block_number: block,
                ..Default::default()
            },
            ty,
        ))
    }

    fn token(hash: &str, block: u64) -> TxRecord {
        TxRecord::Token(TokenTx::new(
            TxCommon {
                hash: hash.into(),
                block_number: block,
                ..Default::default()
            },
            TokenTxType::Transfer,
        ))
    }

    fn leg(transport_id: u64, code: &str, block: u64) -> TrackingLeg {
        TrackingLeg {
            order_addr: ORDER.into(),
            order_id: "1".into(),
            transport_id: transport_id.to_string(),
            company_addr: "0x00000000000000000000000000000000000000c1".into(),
            company_name: None,
            code: code.into(),
            incentives: "0".into(),
            block_number: block,
            tx_hash: None,
        }
    }

    fn log(tx_hash: &str, block: u64, index: u64) -> EventLogRecord {
        EventLogRecord::new(
            tx_hash,
            block,
            index,
            "Transfer",
            vec![EventParamSlot {
                name: "value".into(),
                ty: "uint256".into(),
                data: "1".into(),
            }],
        )
    }

    #[tokio::test]
    async fn checkpoint_per_flavor() {
        let store = MemoryStore::new();
        store.save(Checkpoint::now(Flavor::Logistics, 10)).await.unwrap();
        store.save(Checkpoint::now(Flavor::Token, 20)).await.unwrap();
        store.save(Checkpoint::now(Flavor::Logistics, 11)).await.unwrap();

        assert_eq!(store.load(Flavor::Logistics).await.unwrap().unwrap().block_number, 11);
        assert_eq!(store.load(Flavor::Token).await.unwrap().unwrap().block_number, 20);

        store.delete(Flavor::Token).await.unwrap();
        assert!(store.load(Flavor::Token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_transaction_is_skipped_whole() {
        let store = MemoryStore::new();
        let writes = WriteSet::new(token("0xaa", 5)).with_event_logs(vec![log("0xaa", 5, 0)]);
        store.apply(&writes).await.unwrap();
        store.apply(&writes).await.unwrap();

        assert_eq!(store.count_derived(Flavor::Token).await.unwrap(), 1);
        assert_eq!(store.event_logs_for("0xaa").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_hash_in_other_flavor_is_distinct() {
        let store = MemoryStore::new();
        store.apply(&WriteSet::new(token("0xaa", 5))).await.unwrap();
        store
            .apply(&WriteSet::new(logistics("0xaa", 5, LogisticsTxType::Deploy)))
            .await
            .unwrap();
        assert_eq!(store.count_derived(Flavor::Token).await.unwrap(), 1);
        assert_eq!(store.count_derived(Flavor::Logistics).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn legs_are_unique_and_backfilled() {
        let store = MemoryStore::new();
        let mut deploy = WriteSet::new(logistics("0x01", 3, LogisticsTxType::Deploy));
        deploy.new_legs = (0..11).map(|i| leg(i, &format!("{}", 100 + i), 3)).collect();
        store.apply(&deploy).await.unwrap();

        let mut submit = WriteSet::new(logistics("0x02", 4, LogisticsTxType::Submit));
        submit.new_legs = vec![leg(0, "999", 4)];
        store.apply(&submit).await.unwrap();

        let mut update = WriteSet::new(logistics("0x03", 5, LogisticsTxType::OrderUpdate));
        update.leg_updates = vec![LegTxHashUpdate {
            order_addr: ORDER.into(),
            code: "102".into(),
            tx_hash: "0x03".into(),
        }];
        store.apply(&update).await.unwrap();

        let legs = store.legs_for_order(ORDER).await.unwrap();
        assert_eq!(legs.len(), 11);
        assert_eq!(legs[0].code, "100");
        assert_eq!(legs[10].transport_id, "10");
        assert_eq!(legs[2].tx_hash.as_deref(), Some("0x03"));
        assert!(legs[1].tx_hash.is_none());
        assert!(store.has_legs(ORDER).await.unwrap());
        assert!(!store.has_legs("0xnone").await.unwrap());
    }

    #[tokio::test]
    async fn rollback_removes_only_that_block_and_flavor() {
        let store = MemoryStore::new();
        let mut at_7 = WriteSet::new(logistics("0x07", 7, LogisticsTxType::Deploy))
            .with_event_logs(vec![log("0x07", 7, 0), log("0x07", 7, 1)]);
        at_7.new_legs = vec![leg(0, "1", 7), leg(1, "2", 7)];
        store.apply(&at_7).await.unwrap();
        store
            .apply(&WriteSet::new(logistics("0x06", 6, LogisticsTxType::Register)))
            .await
            .unwrap();
        store
            .apply(&WriteSet::new(token("0x70", 7)).with_event_logs(vec![log("0x70", 7, 0)]))
            .await
            .unwrap();

        let report = store.rollback_block(Flavor::Logistics, 7).await.unwrap();
        assert_eq!(report, RollbackReport { transactions: 1, legs: 2, event_logs: 2 });
        assert_eq!(store.count_derived(Flavor::Logistics).await.unwrap(), 1);
        assert_eq!(store.count_derived(Flavor::Token).await.unwrap(), 1);
        assert_eq!(store.event_log_count(), 1);

        let again = store.rollback_block(Flavor::Logistics, 7).await.unwrap();
        assert_eq!(again.total(), 0);
    }

    #[tokio::test]
    async fn find_with_filter_sort_and_limit() {
        let store = MemoryStore::new();
        for (hash, block) in [("0x01", 1), ("0x02", 2), ("0x03", 3)] {
            store.apply(&WriteSet::new(token(hash, block))).await.unwrap();
        }

        let newest = store
            .find_transactions(
                Flavor::Token,
                &TxQuery {
                    newest_first: true,
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let hashes: Vec<_> = newest.iter().map(|tx| tx.hash().to_string()).collect();
        assert_eq!(hashes, ["0x03", "0x02"]);

        let at_2 = store
            .find_transactions(
                Flavor::Token,
                &TxQuery {
                    block_number: Some(2),
                    tx_type: Some("TRANSFER".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(at_2.len(), 1);
        assert!(store.transaction(Flavor::Token, "0x02").await.unwrap().is_some());
        assert!(store.transaction(Flavor::Logistics, "0x02").await.unwrap().is_none());
    }
}
