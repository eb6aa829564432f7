//! Capability probing: is an address one of ours, and which family is it?
//!
//! Recognition is two ERC-165 checks: the ERC-165 interface id itself and the
//! platform interface id. The family comes from the contract's tag accessor.
//! Probing EOAs and foreign contracts is the common case, so every failure is
//! a debug log and a negative answer.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use logiscan_core::types::ContractFamily;

use crate::client::ChainClient;
use crate::contract::ContractReader;

/// `supportsInterface(bytes4)` itself.
pub const ERC165_INTERFACE_ID: [u8; 4] = [0x01, 0xff, 0xc9, 0xa7];
/// Interface id every platform contract advertises.
pub const PLATFORM_INTERFACE_ID: [u8; 4] = [0x94, 0x6e, 0xdb, 0xed];

pub struct CapabilityProber<C: ?Sized> {
    reader: ContractReader<C>,
    /// Positive answers only. Code and tag of a deployed contract never change.
    cache: Mutex<HashMap<String, ContractFamily>>,
}

impl<C: ChainClient + ?Sized> CapabilityProber<C> {
    pub fn new(reader: ContractReader<C>) -> Self {
        Self {
            reader,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, ContractFamily>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Both interface checks pass. Any error counts as "no".
    pub async fn is_recognized(&self, address: &str) -> bool {
        for id in [ERC165_INTERFACE_ID, PLATFORM_INTERFACE_ID] {
            match self.reader.supports_interface(address, id).await {
                Ok(true) => {}
                Ok(false) => return false,
                Err(e) => {
                    tracing::debug!(address, interface = %hex::encode(id), error = %e, "probe failed");
                    return false;
                }
            }
        }
        true
    }

    pub async fn family_of(&self, address: &str) -> Option<ContractFamily> {
        match self.reader.family_tag(address).await {
            Ok(tag) => {
                let family = ContractFamily::from_tag(&tag);
                if family.is_none() {
                    tracing::debug!(address, tag = %tag, "unknown family tag");
                }
                family
            }
            Err(e) => {
                tracing::debug!(address, error = %e, "family tag read failed");
                None
            }
        }
    }

    /// Recognition and family in one step, cached per address.
    pub async fn probe(&self, address: &str) -> Option<ContractFamily> {
        let key = address.to_ascii_lowercase();
        if let Some(family) = self.cache().get(&key) {
            return Some(*family);
        }
        if !self.is_recognized(address).await {
            return None;
        }
        let family = self.family_of(address).await?;
        self.cache().insert(key, family);
        Some(family)
    }

    pub fn cached(&self) -> usize {
        self.cache().len()
    }
}
