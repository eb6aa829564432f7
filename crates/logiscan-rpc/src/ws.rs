//! WebSocket JSON-RPC transport.
//!
//! A background task owns the connection. Callers talk to it over a command
//! channel; responses come back on oneshot channels keyed by request id.
//! When the socket drops, in-flight requests fail with a retryable error,
//! the task reconnects with exponential backoff, and every live subscription
//! is re-issued and re-keyed to the node's new subscription id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::subscriptions::{SubscriptionId, SubscriptionRegistry};
use crate::transport::{RpcTransport, RpcTransportExt};

type Reply = oneshot::Sender<Result<Value, TransportError>>;

#[derive(Debug, Clone)]
pub struct WsConfig {
    pub reconnect_initial: Duration,
    pub reconnect_max: Duration,
    pub request_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            reconnect_initial: Duration::from_millis(500),
            reconnect_max: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
        }
    }
}

enum Command {
    Request { req: JsonRpcRequest, reply: Reply },
    Shutdown,
}

pub struct WsTransport {
    url: String,
    commands: mpsc::UnboundedSender<Command>,
    subscriptions: SubscriptionRegistry,
    next_id: AtomicU64,
    request_timeout: Duration,
}

impl WsTransport {
    /// Start the background connection task for `url`.
    ///
    /// Returns immediately; the first connection attempt happens in the task.
    pub fn connect(url: impl Into<String>, config: WsConfig) -> Self {
        let url = url.into();
        let (commands, rx) = mpsc::unbounded_channel();
        let subscriptions = SubscriptionRegistry::new();
        let request_timeout = config.request_timeout;

        tokio::spawn(connection_task(url.clone(), config, rx, subscriptions.clone()));

        Self {
            url,
            commands,
            subscriptions,
            next_id: AtomicU64::new(1),
            request_timeout,
        }
    }

    /// `eth_subscribe` to `kind` (e.g. `"newHeads"`).
    pub async fn subscribe(
        &self,
        kind: &str,
        params: Vec<Value>,
    ) -> Result<(SubscriptionId, mpsc::UnboundedReceiver<Value>), TransportError> {
        let mut call_params = vec![Value::String(kind.to_string())];
        call_params.extend(params.iter().cloned());
        let id: String = self.call("eth_subscribe", Value::Array(call_params)).await?;
        let id = SubscriptionId(id);
        let rx = self.subscriptions.register(id.clone(), kind, params);
        tracing::info!(subscription = %id, kind, "subscribed");
        Ok((id, rx))
    }

    pub async fn unsubscribe(&self, id: &SubscriptionId) -> Result<(), TransportError> {
        self.subscriptions.remove(id);
        let _: bool = self.call("eth_unsubscribe", json!([id.0])).await?;
        Ok(())
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

#[async_trait]
impl RpcTransport for WsTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let req = JsonRpcRequest::new(self.next_id.fetch_add(1, Ordering::Relaxed), method, params);
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Request { req, reply })
            .map_err(|_| TransportError::Closed)?;

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_) => Err(TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }),
        }
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Ids for re-subscribe calls count down from the top so they never collide
/// with caller ids.
struct Resubscriber {
    next_id: u64,
    waiting: HashMap<u64, SubscriptionId>,
}

impl Resubscriber {
    fn request(&mut self, old: SubscriptionId, kind: String, params: Vec<Value>) -> JsonRpcRequest {
        let id = self.next_id;
        self.next_id -= 1;
        self.waiting.insert(id, old);
        let mut call_params = vec![Value::String(kind)];
        call_params.extend(params);
        JsonRpcRequest::new(id, "eth_subscribe", Value::Array(call_params))
    }
}

async fn connection_task(
    url: String,
    config: WsConfig,
    mut commands: mpsc::UnboundedReceiver<Command>,
    subscriptions: SubscriptionRegistry,
) {
    let mut pending: HashMap<u64, Reply> = HashMap::new();
    let mut resub = Resubscriber {
        next_id: u64::MAX,
        waiting: HashMap::new(),
    };
    let mut backoff = config.reconnect_initial;

    loop {
        tracing::info!(url = %url, "connecting via WebSocket");
        match tokio_tungstenite::connect_async(url.as_str()).await {
            Err(e) => {
                tracing::warn!(url = %url, error = %e, ?backoff, "WebSocket connect failed");
            }
            Ok((stream, _)) => {
                backoff = config.reconnect_initial;
                let (mut sink, mut source) = stream.split();

                for (old, kind, params) in subscriptions.snapshot() {
                    let req = resub.request(old, kind, params);
                    if let Ok(text) = serde_json::to_string(&req) {
                        let _ = sink.send(Message::Text(text)).await;
                    }
                }

                loop {
                    tokio::select! {
                        cmd = commands.recv() => match cmd {
                            None | Some(Command::Shutdown) => return,
                            Some(Command::Request { req, reply }) => {
                                let text = match serde_json::to_string(&req) {
                                    Ok(text) => text,
                                    Err(e) => {
                                        let _ = reply.send(Err(e.into()));
                                        continue;
                                    }
                                };
                                pending.insert(req.id, reply);
                                if sink.send(Message::Text(text)).await.is_err() {
                                    break;
                                }
                            }
                        },
                        msg = source.next() => match msg {
                            Some(Ok(Message::Text(text))) => {
                                handle_text(&text, &mut pending, &mut resub, &subscriptions);
                            }
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Err(e)) => {
                                tracing::warn!(url = %url, error = %e, "WebSocket receive error");
                                break;
                            }
                            Some(Ok(_)) => {}
                        },
                    }
                }

                for (_, reply) in pending.drain() {
                    let _ = reply.send(Err(TransportError::WebSocket("connection lost".into())));
                }
                resub.waiting.clear();
                tracing::warn!(url = %url, ?backoff, "WebSocket disconnected");
            }
        }

        // Requests arriving while disconnected fail fast instead of queueing.
        let sleep = tokio::time::sleep(backoff);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                cmd = commands.recv() => match cmd {
                    None | Some(Command::Shutdown) => return,
                    Some(Command::Request { reply, .. }) => {
                        let _ = reply.send(Err(TransportError::WebSocket("not connected".into())));
                    }
                },
            }
        }
        backoff = (backoff * 2).min(config.reconnect_max);
    }
}

fn handle_text(
    text: &str,
    pending: &mut HashMap<u64, Reply>,
    resub: &mut Resubscriber,
    subscriptions: &SubscriptionRegistry,
) {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        tracing::debug!("ignoring non-JSON WebSocket message");
        return;
    };

    if value.get("method").and_then(Value::as_str) == Some("eth_subscription") {
        let params = &value["params"];
        if let Some(id) = params["subscription"].as_str() {
            subscriptions.dispatch(&SubscriptionId(id.to_string()), params["result"].clone());
        }
        return;
    }

    let Ok(resp) = serde_json::from_value::<JsonRpcResponse>(value) else {
        tracing::debug!("ignoring malformed JSON-RPC response");
        return;
    };
    let Some(id) = resp.id else {
        return;
    };

    if let Some(old) = resub.waiting.remove(&id) {
        match resp.into_result() {
            Ok(Value::String(new)) => subscriptions.rekey(&old, SubscriptionId(new)),
            Ok(other) => tracing::warn!(subscription = %old, result = %other, "unexpected re-subscribe result"),
            Err(e) => tracing::warn!(subscription = %old, error = %e, "re-subscribe failed"),
        }
        return;
    }

    if let Some(reply) = pending.remove(&id) {
        let _ = reply.send(resp.into_result().map_err(TransportError::Rpc));
    }
}
