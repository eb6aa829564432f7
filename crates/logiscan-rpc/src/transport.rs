//! The `RpcTransport` trait implemented by the HTTP and WebSocket transports.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;

/// Sends one JSON-RPC call and returns its `result` value.
///
/// Object safe, so a transport can be stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError>;

    /// The endpoint URL, for logging.
    fn endpoint(&self) -> &str;
}

/// Typed convenience layered over [`RpcTransport::request`].
#[async_trait]
pub trait RpcTransportExt: RpcTransport {
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, TransportError> {
        let value = self.request(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl<T: RpcTransport + ?Sized> RpcTransportExt for T {}
