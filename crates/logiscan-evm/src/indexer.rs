//! One scanner process: configuration, chain client, store and interfaces
//! wired together.

use std::sync::Arc;
use std::time::Duration;

use logiscan_abi::Interfaces;
use logiscan_core::config::ScanConfig;
use logiscan_core::error::IndexerError;
use logiscan_core::store::IndexStore;
use logiscan_rpc::{HttpConfig, HttpTransport, WsConfig, WsTransport};

use crate::classifier::Classifier;
use crate::client::{ChainClient, RpcChainClient};
use crate::resume::{ResumeManager, StartPoint};
use crate::scanner::Scanner;

pub struct Indexer<C: ?Sized, S: ?Sized> {
    config: ScanConfig,
    client: Arc<C>,
    store: Arc<S>,
    classifier: Arc<Classifier<C>>,
}

impl<S: IndexStore + ?Sized> Indexer<RpcChainClient, S> {
    /// Build a JSON-RPC client from the configured endpoints.
    pub fn connect(config: ScanConfig, store: Arc<S>) -> Result<Self, IndexerError> {
        config.validate()?;
        let http = HttpTransport::new(config.rpc_url.clone(), HttpConfig::default())
            .map_err(|e| IndexerError::Rpc(e.to_string()))?;
        let mut client = RpcChainClient::new(
            Arc::new(http),
            Duration::from_millis(config.poll_interval_ms),
        );
        if let Some(ws_url) = &config.ws_url {
            let ws = WsTransport::connect(ws_url.clone(), WsConfig::default());
            client = client.with_ws(Arc::new(ws));
        }
        let interfaces = load_interfaces(&config)?;
        Self::new(config, Arc::new(client), store, Arc::new(interfaces))
    }
}

impl<C, S> Indexer<C, S>
where
    C: ChainClient + ?Sized,
    S: IndexStore + ?Sized,
{
    pub fn new(
        config: ScanConfig,
        client: Arc<C>,
        store: Arc<S>,
        interfaces: Arc<Interfaces>,
    ) -> Result<Self, IndexerError> {
        let classifier = Classifier::new(config.flavor, Arc::clone(&client), interfaces)?;
        Ok(Self {
            config,
            client,
            store,
            classifier: Arc::new(classifier),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validate genesis and resolve the start block.
    pub async fn prepare(&self) -> Result<StartPoint, IndexerError> {
        ResumeManager::new(
            self.config.flavor,
            &*self.client,
            self.classifier.prober(),
            &*self.store,
        )
        .resolve_start_block(&self.config.root_address, self.config.start_block)
        .await
    }

    pub fn scanner(&self) -> Scanner<C, S> {
        Scanner::new(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            Arc::clone(&self.classifier),
        )
        .with_poll_interval(Duration::from_millis(self.config.poll_interval_ms))
    }

    /// Resolve the start block and scan forever.
    pub async fn run(&self) -> Result<(), IndexerError> {
        let start = self.prepare().await?;
        tracing::info!(
            flavor = %self.config.flavor,
            root = %self.config.root_address,
            block = start.block,
            resumed = start.resumed,
            "scanner starting"
        );
        self.scanner().run(start.block).await
    }
}

/// Embedded interfaces, with overrides from the configured ABI directory.
pub fn load_interfaces(config: &ScanConfig) -> Result<Interfaces, IndexerError> {
    let interfaces = match &config.abi_dir {
        Some(dir) => Interfaces::load_dir(dir)?,
        None => Interfaces::embedded()?,
    };
    Ok(interfaces)
}
