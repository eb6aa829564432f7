//! Startup gate: genesis validation and resume-point resolution.
//!
//! The checkpoint holds the block whose processing most recently *started*,
//! so its records may be partial. Resuming deletes every derived record
//! tagged with exactly that block and processes it again.

use logiscan_core::error::IndexerError;
use logiscan_core::store::{IndexStore, RollbackReport};
use logiscan_core::types::Flavor;

use crate::client::{BlockId, ChainClient};
use crate::prober::CapabilityProber;

/// Where the scanner starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPoint {
    pub block: u64,
    /// `true` when resuming from a checkpoint.
    pub resumed: bool,
    /// Records of the checkpoint block removed before resuming.
    pub rolled_back: RollbackReport,
}

pub struct ResumeManager<'a, C: ?Sized, S: ?Sized> {
    flavor: Flavor,
    client: &'a C,
    prober: &'a CapabilityProber<C>,
    store: &'a S,
}

impl<'a, C, S> ResumeManager<'a, C, S>
where
    C: ChainClient + ?Sized,
    S: IndexStore + ?Sized,
{
    pub fn new(
        flavor: Flavor,
        client: &'a C,
        prober: &'a CapabilityProber<C>,
        store: &'a S,
    ) -> Self {
        Self {
            flavor,
            client,
            prober,
            store,
        }
    }

    /// Returns `true` if `block` deploys `root` as a recognized contract of
    /// the flavor's root family.
    pub async fn validate_genesis(&self, root: &str, block: u64) -> Result<bool, IndexerError> {
        let Some(genesis) = self.client.block(BlockId::Number(block), true).await? else {
            tracing::warn!(block, "genesis block not found");
            return Ok(false);
        };

        for tx in genesis.transactions.iter().filter(|tx| tx.is_deploy() && tx.has_input()) {
            let Some(receipt) = self.client.receipt(&tx.hash).await? else {
                continue;
            };
            let deploys_root = receipt
                .contract_address
                .as_deref()
                .is_some_and(|addr| addr.eq_ignore_ascii_case(root));
            if !deploys_root {
                continue;
            }
            let family = self.prober.probe(root).await;
            if family == Some(self.flavor.root_family()) {
                return Ok(true);
            }
            tracing::warn!(
                root,
                block,
                family = ?family,
                expected = %self.flavor.root_family(),
                "root contract deployed but not recognized as the root family"
            );
        }
        Ok(false)
    }

    /// Decide the first block to scan. Calling this again without scanning
    /// in between yields the same block.
    pub async fn resolve_start_block(
        &self,
        root: &str,
        default: u64,
    ) -> Result<StartPoint, IndexerError> {
        if !self.validate_genesis(root, default).await? {
            return Err(IndexerError::InvalidGenesis {
                block_number: default,
            });
        }

        match self.store.load(self.flavor).await? {
            None => {
                let derived = self.store.count_derived(self.flavor).await?;
                if derived > 0 {
                    return Err(IndexerError::InconsistentState {
                        reason: format!(
                            "no {} checkpoint but {derived} derived records exist; reset the database",
                            self.flavor
                        ),
                    });
                }
                tracing::info!(flavor = %self.flavor, block = default, "fresh start");
                Ok(StartPoint {
                    block: default,
                    resumed: false,
                    rolled_back: RollbackReport::default(),
                })
            }
            Some(cp) if cp.block_number >= default => {
                let report = self.store.rollback_block(self.flavor, cp.block_number).await?;
                tracing::info!(
                    flavor = %self.flavor,
                    block = cp.block_number,
                    transactions = report.transactions,
                    legs = report.legs,
                    event_logs = report.event_logs,
                    "resuming from checkpoint"
                );
                Ok(StartPoint {
                    block: cp.block_number,
                    resumed: true,
                    rolled_back: report,
                })
            }
            Some(cp) => Err(IndexerError::InconsistentState {
                reason: format!(
                    "{} checkpoint {} is before the genesis block {default}",
                    self.flavor, cp.block_number
                ),
            }),
        }
    }
}
