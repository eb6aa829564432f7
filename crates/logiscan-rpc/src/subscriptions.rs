//! `eth_subscribe` bookkeeping.
//!
//! A reconnect issues fresh `eth_subscribe` calls and the node answers with new
//! subscription ids. [`SubscriptionRegistry::rekey`] moves the caller's channel
//! over to the new id so the stream continues uninterrupted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub String);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

struct Entry {
    kind: String,
    params: Vec<Value>,
    sender: mpsc::UnboundedSender<Value>,
}

#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    entries: Arc<Mutex<HashMap<SubscriptionId, Entry>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<SubscriptionId, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(
        &self,
        id: SubscriptionId,
        kind: impl Into<String>,
        params: Vec<Value>,
    ) -> mpsc::UnboundedReceiver<Value> {
        let (sender, rx) = mpsc::unbounded_channel();
        self.entries().insert(
            id,
            Entry {
                kind: kind.into(),
                params,
                sender,
            },
        );
        rx
    }

    /// Forward a notification. Entries whose receiver is gone are dropped.
    pub fn dispatch(&self, id: &SubscriptionId, message: Value) {
        let mut entries = self.entries();
        let closed = match entries.get(id) {
            Some(entry) => entry.sender.send(message).is_err(),
            None => {
                tracing::debug!(subscription = %id, "notification for unknown subscription");
                false
            }
        };
        if closed {
            entries.remove(id);
        }
    }

    /// Move the entry registered under `old` to `new`.
    pub fn rekey(&self, old: &SubscriptionId, new: SubscriptionId) {
        let mut entries = self.entries();
        if let Some(entry) = entries.remove(old) {
            tracing::debug!(old = %old, new = %new, kind = %entry.kind, "subscription re-established");
            entries.insert(new, entry);
        }
    }

    pub fn remove(&self, id: &SubscriptionId) {
        self.entries().remove(id);
    }

    /// `(id, kind, params)` of every live subscription, for re-subscribing.
    pub fn snapshot(&self) -> Vec<(SubscriptionId, String, Vec<Value>)> {
        self.entries()
            .iter()
            .map(|(id, e)| (id.clone(), e.kind.clone(), e.params.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
