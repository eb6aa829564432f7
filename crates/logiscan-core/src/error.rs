//! Error types for the logiscan pipeline.

use thiserror::Error;

/// Errors that can occur during scanning.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Handler error in '{handler}': {reason}")]
    Handler { handler: String, reason: String },

    #[error("Genesis block {block_number} does not deploy the expected root contract")]
    InvalidGenesis { block_number: u64 },

    #[error("Inconsistent indexer state: {reason}")]
    InconsistentState { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl IndexerError {
    pub fn handler(handler: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Handler {
            handler: handler.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors that must abort startup rather than be
    /// logged and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidGenesis { .. } | Self::InconsistentState { .. } | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(IndexerError::InvalidGenesis { block_number: 7 }.is_fatal());
        assert!(IndexerError::InconsistentState { reason: "x".into() }.is_fatal());
        assert!(IndexerError::Config("missing root".into()).is_fatal());
        assert!(!IndexerError::Rpc("timeout".into()).is_fatal());
        assert!(!IndexerError::handler("order", "truncated calldata").is_fatal());
    }

    #[test]
    fn handler_error_message() {
        let err = IndexerError::handler("company", "missing event");
        assert_eq!(err.to_string(), "Handler error in 'company': missing event");
    }
}
