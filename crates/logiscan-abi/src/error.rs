//! ABI error types.

use logiscan_core::error::IndexerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("invalid ABI JSON for '{interface}': {reason}")]
    InvalidJson { interface: String, reason: String },

    #[error("function '{0}' not found in interface")]
    UnknownFunction(String),

    #[error("unsupported type '{ty}' for '{name}': {reason}")]
    UnsupportedType {
        name: String,
        ty: String,
        reason: String,
    },

    #[error("calldata truncated: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("ABI decode failed: {0}")]
    Decode(String),

    #[error("I/O error reading '{path}': {reason}")]
    Io { path: String, reason: String },
}

impl From<AbiError> for IndexerError {
    fn from(e: AbiError) -> Self {
        IndexerError::Decode(e.to_string())
    }
}
