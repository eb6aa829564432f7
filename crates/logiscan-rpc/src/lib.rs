//! logiscan-rpc: JSON-RPC plumbing for talking to an EVM node.
//!
//! - [`http::HttpTransport`]: `reqwest` POST transport with exponential-backoff retry
//! - [`ws::WsTransport`]: WebSocket transport owning a background connection task,
//!   reconnecting and re-subscribing `eth_subscribe` streams transparently

pub mod error;
pub mod http;
pub mod request;
pub mod retry;
pub mod subscriptions;
pub mod transport;
pub mod ws;

pub use error::TransportError;
pub use http::{HttpConfig, HttpTransport};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use retry::RetryPolicy;
pub use subscriptions::{SubscriptionId, SubscriptionRegistry};
pub use transport::{RpcTransport, RpcTransportExt};
pub use ws::{WsConfig, WsTransport};
