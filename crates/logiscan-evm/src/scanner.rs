//! The block scanner: backfill, then live tail.
//!
//! # Backfill
//! Walk blocks from the start block while `n <= head`, re-reading the head
//! every iteration so a backfill that runs for hours doesn't stop short.
//!
//! # Live tail
//! Follow new heads. Each header is processed by hash. A header that skips
//! ahead has its gap filled by number first. A header at or below the last
//! processed block replaces it: records from that number onward are rolled
//! back before the replacement is processed.
//!
//! A header whose number doesn't parse is logged and skipped. It never
//! triggers a rollback.
//!
//! Rollback is by block number only. A code update in a rolled-back block
//! has already set `tx_hash` on legs materialized in earlier blocks; those
//! legs keep the hash until the code update is processed again.
//!
//! Per block, the checkpoint is saved *before* the transactions so a crash
//! mid-block leaves a checkpoint the resume manager can roll back.

use std::sync::Arc;
use std::time::Duration;

use logiscan_core::checkpoint::{Checkpoint, ScannerState};
use logiscan_core::error::IndexerError;
use logiscan_core::store::{IndexStore, RollbackReport};

use crate::classifier::Classifier;
use crate::client::{BlockId, ChainClient};
use crate::types::Block;

/// Attempts at fetching a block the node doesn't have yet.
const BLOCK_FETCH_ATTEMPTS: u32 = 3;

/// Outcome of processing one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStats {
    pub number: u64,
    pub transactions: usize,
    /// Transactions that produced a committed write set.
    pub recorded: usize,
    /// Transactions whose classification or commit failed.
    pub skipped: usize,
}

pub struct Scanner<C: ?Sized, S: ?Sized> {
    client: Arc<C>,
    store: Arc<S>,
    classifier: Arc<Classifier<C>>,
    state: ScannerState,
    poll_interval: Duration,
}

impl<C, S> Scanner<C, S>
where
    C: ChainClient + ?Sized,
    S: IndexStore + ?Sized,
{
    pub fn new(client: Arc<C>, store: Arc<S>, classifier: Arc<Classifier<C>>) -> Self {
        Self {
            state: ScannerState::new(classifier.flavor()),
            client,
            store,
            classifier,
            poll_interval: Duration::from_secs(2),
        }
    }

    /// Delay before retrying a head or block read.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Backfill from `start`, then follow the chain. Returns only if the
    /// new-heads stream ends.
    pub async fn run(&mut self, start: u64) -> Result<(), IndexerError> {
        let next = self.sync_historical(start).await?;
        tracing::info!(flavor = %self.state.flavor, next, "backfill complete, following new heads");
        self.tail_live(next).await
    }

    /// Process blocks `start..=head`. Returns the next block number.
    pub async fn sync_historical(&mut self, start: u64) -> Result<u64, IndexerError> {
        let mut n = start;
        loop {
            let head = match self.client.block_number().await {
                Ok(head) => head,
                Err(e) => {
                    tracing::warn!(error = %e, "head read failed, retrying");
                    tokio::time::sleep(self.poll_interval).await;
                    continue;
                }
            };
            if n > head {
                return Ok(n);
            }
            if let Some(block) = self.fetch_block(BlockId::Number(n)).await {
                if let Some(stats) = self.process_or_skip(&block).await {
                    if n % 1000 == 0 || n == head {
                        tracing::info!(block = n, head, recorded = stats.recorded, "backfill progress");
                    }
                }
            }
            n += 1;
        }
    }

    /// Follow new heads until the stream ends.
    pub async fn tail_live(&mut self, next: u64) -> Result<(), IndexerError> {
        let mut heads = self.client.subscribe_new_heads().await?;
        while let Some(header) = heads.recv().await {
            let number = match header.number_u64() {
                Ok(number) => number,
                Err(e) => {
                    tracing::warn!(hash = %header.hash, error = %e, "unparsable header skipped");
                    continue;
                }
            };

            if let Some(last) = self.state.last_block {
                if number <= last {
                    tracing::warn!(block = number, last, "replacement block, rolling back");
                    self.rollback_range(number, last).await;
                }
            }

            let expected = self.state.next_block(next);
            for gap in expected..number {
                tracing::debug!(block = gap, "filling gap");
                if let Some(block) = self.fetch_block(BlockId::Number(gap)).await {
                    self.process_or_skip(&block).await;
                }
            }

            if let Some(block) = self.fetch_block(BlockId::Hash(header.hash.clone())).await {
                self.process_or_skip(&block).await;
            }
        }
        Err(IndexerError::Rpc("new-heads stream ended".into()))
    }

    /// Save the checkpoint, then classify and commit every transaction.
    ///
    /// Fails only when the block's number or timestamp doesn't parse, before
    /// anything is written.
    pub async fn process_block(&mut self, block: &Block) -> Result<BlockStats, IndexerError> {
        let number = block.number_u64()?;
        let timestamp = block.timestamp_i64()?;
        let flavor = self.state.flavor;

        if let Err(e) = self.store.save(Checkpoint::now(flavor, number)).await {
            tracing::error!(block = number, error = %e, "checkpoint save failed");
        }
        self.state.last_block = Some(number);

        let mut stats = BlockStats {
            number,
            transactions: block.transactions.len(),
            ..Default::default()
        };
        for tx in &block.transactions {
            let result = match self
                .classifier
                .classify(tx, number, timestamp, &*self.store)
                .await
            {
                Ok(Some(writes)) => self.store.apply(&writes).await.map(|_| true),
                Ok(None) => Ok(false),
                Err(e) => Err(e),
            };
            match result {
                Ok(true) => stats.recorded += 1,
                Ok(false) => {}
                Err(e) => {
                    stats.skipped += 1;
                    tracing::warn!(block = number, tx = %tx.hash, error = %e, "transaction skipped");
                }
            }
        }

        tracing::debug!(
            block = number,
            transactions = stats.transactions,
            recorded = stats.recorded,
            skipped = stats.skipped,
            "block processed"
        );
        Ok(stats)
    }

    async fn process_or_skip(&mut self, block: &Block) -> Option<BlockStats> {
        match self.process_block(block).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!(hash = %block.hash, error = %e, "block skipped");
                None
            }
        }
    }

    async fn fetch_block(&self, id: BlockId) -> Option<Block> {
        for attempt in 1..=BLOCK_FETCH_ATTEMPTS {
            match self.client.block(id.clone(), true).await {
                Ok(Some(block)) => return Some(block),
                Ok(None) => {
                    tracing::debug!(block = %id, attempt, "block not available yet");
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    tracing::warn!(block = %id, error = %e, "block fetch failed, skipping");
                    return None;
                }
            }
        }
        tracing::warn!(block = %id, "block never became available, skipping");
        None
    }

    async fn rollback_range(&mut self, from: u64, to: u64) -> RollbackReport {
        let mut total = RollbackReport::default();
        for n in from..=to {
            match self.store.rollback_block(self.state.flavor, n).await {
                Ok(report) => total.merge(report),
                Err(e) => tracing::error!(block = n, error = %e, "rollback failed"),
            }
        }
        self.state.last_block = from.checked_sub(1);
        total
    }
}
