//! logiscan-abi: contract interfaces and the decoding built on them.
//!
//! # Modules
//! - [`interfaces`]: embedded ABI JSON per contract family, call encoding
//! - [`signature`]: the event signature table (name, inputs, topic)
//! - [`log_decoder`]: receipt logs → typed event occurrences
//! - [`calldata`]: selector dispatch and fixed-width argument decoding
//! - [`normalizer`]: `DynSolValue` → display strings

pub mod calldata;
pub mod error;
pub mod interfaces;
pub mod log_decoder;
pub mod normalizer;
pub mod signature;

pub use calldata::{CallArgs, Selector, SelectorMap};
pub use error::AbiError;
pub use interfaces::{ContractInterface, InterfaceKind, Interfaces};
pub use log_decoder::{decode_log, decode_logs, DecodedArg, EventOccurrence, LogInput};
pub use signature::{canonical_signature, keccak256, EventSignature, EventTable};
