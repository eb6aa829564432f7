//! logiscan-evm: the chain-facing half of Logiscan.
//!
//! # Pipeline
//! 1. [`resume::ResumeManager`] validates the genesis block and picks the start block
//! 2. [`scanner::Scanner`] walks blocks from there (backfill, then live tail)
//! 3. [`classifier::Classifier`] turns each transaction into a [`WriteSet`]
//!    via the per-family [`handlers`]
//! 4. The store applies the write set atomically
//!
//! [`WriteSet`]: logiscan_core::records::WriteSet

pub mod builder;
pub mod classifier;
pub mod client;
pub mod contract;
pub mod handlers;
pub mod indexer;
pub mod prober;
pub mod resume;
pub mod scanner;
pub mod types;
pub mod units;

pub use builder::ScanConfigBuilder;
pub use classifier::Classifier;
pub use client::{BlockId, ChainClient, RpcChainClient};
pub use contract::{ContractReader, TrackingEntry};
pub use indexer::Indexer;
pub use prober::CapabilityProber;
pub use resume::{ResumeManager, StartPoint};
pub use scanner::{BlockStats, Scanner};
pub use types::{Block, BlockHeader, RawLog, Receipt, Transaction};
