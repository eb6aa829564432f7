//! logiscan-core: domain model shared by every Logiscan crate.
//!
//! # Overview
//! - [`types`]: scanner flavors and contract families
//! - [`records`]: the derived records written by the classifier
//! - [`checkpoint`]: per-flavor resume position and scanner state
//! - [`store`]: the document-store traits backends implement
//! - [`config`]: scanner configuration
//! - [`error`]: the shared error type

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod records;
pub mod store;
pub mod types;

pub use checkpoint::{Checkpoint, ScannerState};
pub use config::ScanConfig;
pub use error::IndexerError;
pub use records::{
    EventLogRecord, EventParamSlot, LegTxHashUpdate, LogisticsTx, LogisticsTxType, TokenTx,
    TokenTxType, TrackingLeg, TxCategory, TxCommon, TxRecord, WriteSet,
};
pub use store::{CheckpointStore, IndexStore, RecordStore, RollbackReport, TxQuery};
pub use types::{ContractFamily, Flavor};
