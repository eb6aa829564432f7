//! Scanner configuration.

use serde::{Deserialize, Serialize};

use crate::error::IndexerError;
use crate::types::Flavor;

/// Configuration for one scanner process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub flavor: Flavor,
    /// Address of the root contract deployed in the genesis block.
    pub root_address: String,
    /// Block that deploys the root contract; scanning starts here on a fresh store.
    pub start_block: u64,
    /// HTTP JSON-RPC endpoint.
    pub rpc_url: String,
    /// WebSocket endpoint for `newHeads`. `None` = poll `eth_blockNumber`.
    pub ws_url: Option<String>,
    /// SQLite path or URL.
    pub database: String,
    /// Head polling interval when no WebSocket endpoint is configured (milliseconds).
    pub poll_interval_ms: u64,
    /// Directory with `<family>.json` ABI overrides.
    pub abi_dir: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            flavor: Flavor::Logistics,
            root_address: String::new(),
            start_block: 0,
            rpc_url: "http://127.0.0.1:8545".into(),
            ws_url: None,
            database: "./logiscan.db".into(),
            poll_interval_ms: 2000,
            abi_dir: None,
        }
    }
}

impl ScanConfig {
    /// Reject configurations the scanner cannot start with.
    pub fn validate(&self) -> Result<(), IndexerError> {
        let root = self.root_address.strip_prefix("0x").unwrap_or("");
        if root.len() != 40 || !root.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IndexerError::Config(format!(
                "root address '{}' is not a 0x-prefixed 20-byte hex address",
                self.root_address
            )));
        }
        if self.rpc_url.is_empty() {
            return Err(IndexerError::Config("RPC URL is empty".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(IndexerError::Config("poll interval must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_requires_root() {
        let cfg = ScanConfig::default();
        assert!(matches!(cfg.validate(), Err(IndexerError::Config(_))));
    }

    #[test]
    fn valid_config() {
        let cfg = ScanConfig {
            root_address: "0x00000000000000000000000000000000000000aA".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
