//! Fluent builder for [`ScanConfig`].
//!
//! # Example
//!
//! ```rust
//! use logiscan_evm::ScanConfigBuilder;
//! use logiscan_core::types::Flavor;
//!
//! let config = ScanConfigBuilder::new(Flavor::Token)
//!     .root("0x00000000000000000000000000000000000000aa")
//!     .start_block(1_200)
//!     .rpc_url("http://localhost:8545")
//!     .build()
//!     .unwrap();
//! assert_eq!(config.start_block, 1_200);
//! ```

use logiscan_core::config::ScanConfig;
use logiscan_core::error::IndexerError;
use logiscan_core::types::Flavor;

#[derive(Debug, Clone, Default)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    pub fn new(flavor: Flavor) -> Self {
        Self {
            config: ScanConfig {
                flavor,
                ..ScanConfig::default()
            },
        }
    }

    /// Address of the root contract.
    pub fn root(mut self, address: impl Into<String>) -> Self {
        self.config.root_address = address.into();
        self
    }

    /// Block that deploys the root contract.
    pub fn start_block(mut self, block: u64) -> Self {
        self.config.start_block = block;
        self
    }

    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.config.rpc_url = url.into();
        self
    }

    /// Follow new heads over WebSocket instead of polling.
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.config.ws_url = Some(url.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Directory with `<family>.json` ABI overrides.
    pub fn abi_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.abi_dir = Some(dir.into());
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<ScanConfig, IndexerError> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// The configuration as-is, without validation.
    pub fn build_unchecked(self) -> ScanConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn builder_defaults() {
        let cfg = ScanConfigBuilder::new(Flavor::Logistics).build_unchecked();
        assert_eq!(cfg.flavor, Flavor::Logistics);
        assert_eq!(cfg.poll_interval_ms, 2000);
        assert!(cfg.ws_url.is_none());
    }

    #[test]
    fn builder_custom() {
        let cfg = ScanConfigBuilder::new(Flavor::Token)
            .root(ROOT)
            .start_block(77)
            .rpc_url("http://node:8545")
            .ws_url("ws://node:8546")
            .database("sqlite::memory:")
            .poll_interval_ms(500)
            .abi_dir("./abi")
            .build()
            .unwrap();

        assert_eq!(cfg.flavor, Flavor::Token);
        assert_eq!(cfg.root_address, ROOT);
        assert_eq!(cfg.start_block, 77);
        assert_eq!(cfg.ws_url.as_deref(), Some("ws://node:8546"));
        assert_eq!(cfg.database, "sqlite::memory:");
        assert_eq!(cfg.poll_interval_ms, 500);
        assert_eq!(cfg.abi_dir.as_deref(), Some("./abi"));
    }

    #[test]
    fn build_rejects_missing_root() {
        let err = ScanConfigBuilder::new(Flavor::Token).build().unwrap_err();
        assert!(err.is_fatal());
    }
}
