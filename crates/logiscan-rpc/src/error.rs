//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, timeout, non-2xx status.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error: {0}")]
    Rpc(JsonRpcError),

    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The background connection task has shut down.
    #[error("transport closed")]
    Closed,
}

impl TransportError {
    /// Returns `true` if the request may succeed when sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::WebSocket(_) | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(TransportError::Http("connection reset".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 30_000 }.is_retryable());
        assert!(!TransportError::Closed.is_retryable());
        let rpc = TransportError::Rpc(JsonRpcError {
            code: 3,
            message: "execution reverted".into(),
            data: None,
        });
        assert!(!rpc.is_retryable());
    }
}
