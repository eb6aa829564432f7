//! The upstream chain interface.
//!
//! [`ChainClient`] is everything the scanner needs from a node. The JSON-RPC
//! implementation uses HTTP for requests and, when configured, a WebSocket
//! `newHeads` subscription for the live tail. Without a WebSocket endpoint new
//! heads are produced by polling `eth_blockNumber`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use logiscan_core::error::IndexerError;
use logiscan_rpc::{RpcTransport, RpcTransportExt, TransportError, WsTransport};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::types::{decode_hex, parse_quantity, to_hex_quantity, Block, BlockHeader, Receipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockId {
    Number(u64),
    Hash(String),
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "#{n}"),
            Self::Hash(h) => f.write_str(h),
        }
    }
}

/// Trait for reading chain data from a node.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    async fn block_number(&self) -> Result<u64, IndexerError>;

    /// `None` if the node doesn't have the block. With `full` unset the
    /// transaction list comes back empty.
    async fn block(&self, id: BlockId, full: bool) -> Result<Option<Block>, IndexerError>;

    async fn receipt(&self, tx_hash: &str) -> Result<Option<Receipt>, IndexerError>;

    /// `eth_call` against the latest state; returns the raw return data.
    async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, IndexerError>;

    /// Stream of new chain heads.
    async fn subscribe_new_heads(
        &self,
    ) -> Result<mpsc::UnboundedReceiver<BlockHeader>, IndexerError>;
}

fn rpc_err(e: TransportError) -> IndexerError {
    IndexerError::Rpc(e.to_string())
}

/// JSON-RPC backed [`ChainClient`].
pub struct RpcChainClient {
    http: Arc<dyn RpcTransport>,
    ws: Option<Arc<WsTransport>>,
    poll_interval: Duration,
}

impl RpcChainClient {
    pub fn new(http: Arc<dyn RpcTransport>, poll_interval: Duration) -> Self {
        Self {
            http,
            ws: None,
            poll_interval,
        }
    }

    /// Use a WebSocket `newHeads` subscription instead of polling.
    pub fn with_ws(mut self, ws: Arc<WsTransport>) -> Self {
        self.ws = Some(ws);
        self
    }

    async fn ws_heads(
        ws: Arc<WsTransport>,
    ) -> Result<mpsc::UnboundedReceiver<BlockHeader>, IndexerError> {
        let (_id, mut raw) = ws.subscribe("newHeads", vec![]).await.map_err(rpc_err)?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            // The task keeps the transport (and its connection) alive.
            let _ws = ws;
            while let Some(value) = raw.recv().await {
                match serde_json::from_value::<BlockHeader>(value) {
                    Ok(header) => {
                        if tx.send(header).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "malformed newHeads notification"),
                }
            }
        });
        Ok(rx)
    }

    fn polled_heads(&self, mut last: u64) -> mpsc::UnboundedReceiver<BlockHeader> {
        let http = Arc::clone(&self.http);
        let interval = self.poll_interval;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if tx.is_closed() {
                    break;
                }
                let head = match http.call::<String>("eth_blockNumber", json!([])).await {
                    Ok(h) => match parse_quantity(&h) {
                        Ok(head) => head,
                        Err(e) => {
                            tracing::warn!(error = %e, "unparsable head number skipped");
                            continue;
                        }
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "head poll failed");
                        continue;
                    }
                };
                if head <= last {
                    continue;
                }
                match http
                    .call::<Option<BlockHeader>>(
                        "eth_getBlockByNumber",
                        json!([to_hex_quantity(head), false]),
                    )
                    .await
                {
                    Ok(Some(header)) => {
                        last = head;
                        if tx.send(header).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(block = head, error = %e, "head header fetch failed"),
                }
            }
        });
        rx
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn block_number(&self) -> Result<u64, IndexerError> {
        let hex: String = self
            .http
            .call("eth_blockNumber", json!([]))
            .await
            .map_err(rpc_err)?;
        parse_quantity(&hex)
    }

    async fn block(&self, id: BlockId, full: bool) -> Result<Option<Block>, IndexerError> {
        let (method, params) = match &id {
            BlockId::Number(n) => ("eth_getBlockByNumber", json!([to_hex_quantity(*n), full])),
            BlockId::Hash(h) => ("eth_getBlockByHash", json!([h, full])),
        };
        let mut raw: Value = self.http.request(method, params).await.map_err(rpc_err)?;
        if raw.is_null() {
            return Ok(None);
        }
        if !full {
            // Hash-only transaction lists don't fit `Transaction`.
            if let Some(obj) = raw.as_object_mut() {
                obj.remove("transactions");
            }
        }
        serde_json::from_value(raw)
            .map(Some)
            .map_err(|e| IndexerError::Rpc(format!("malformed block {id}: {e}")))
    }

    async fn receipt(&self, tx_hash: &str) -> Result<Option<Receipt>, IndexerError> {
        self.http
            .call("eth_getTransactionReceipt", json!([tx_hash]))
            .await
            .map_err(rpc_err)
    }

    async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, IndexerError> {
        let params = json!([{ "to": to, "data": format!("0x{}", hex::encode(data)) }, "latest"]);
        let ret: Value = self.http.request("eth_call", params).await.map_err(rpc_err)?;
        match ret.as_str() {
            Some(hex) => decode_hex(hex),
            None => Err(IndexerError::Rpc(format!("eth_call returned non-string result: {ret}"))),
        }
    }

    async fn subscribe_new_heads(
        &self,
    ) -> Result<mpsc::UnboundedReceiver<BlockHeader>, IndexerError> {
        match &self.ws {
            Some(ws) => Self::ws_heads(Arc::clone(ws)).await,
            None => {
                let head = self.block_number().await?;
                tracing::info!(
                    interval_ms = self.poll_interval.as_millis() as u64,
                    "no WebSocket endpoint, polling for new heads"
                );
                Ok(self.polled_heads(head))
            }
        }
    }
}
