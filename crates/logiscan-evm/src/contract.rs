//! Read-only contract accessors over `eth_call`.

use std::sync::Arc;

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{B256, U256};
use logiscan_abi::{normalizer, InterfaceKind, Interfaces};
use logiscan_core::error::IndexerError;

use crate::client::ChainClient;

/// One entry of an order's tracking list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingEntry {
    pub company: String,
    pub code: String,
    pub incentives: String,
}

pub struct ContractReader<C: ?Sized> {
    client: Arc<C>,
    interfaces: Arc<Interfaces>,
}

impl<C: ?Sized> Clone for ContractReader<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            interfaces: Arc::clone(&self.interfaces),
        }
    }
}

impl<C: ChainClient + ?Sized> ContractReader<C> {
    pub fn new(client: Arc<C>, interfaces: Arc<Interfaces>) -> Self {
        Self { client, interfaces }
    }

    pub fn interfaces(&self) -> &Interfaces {
        &self.interfaces
    }

    /// Call `function` of the `kind` interface at `to` and decode its outputs.
    pub async fn read(
        &self,
        kind: InterfaceKind,
        to: &str,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, IndexerError> {
        let iface = self.interfaces.get(kind);
        let data = iface.encode_call(function, args)?;
        let ret = self.client.call(to, &data).await?;
        Ok(iface.decode_output(function, &ret)?)
    }

    async fn read_one(
        &self,
        kind: InterfaceKind,
        to: &str,
        function: &str,
        args: &[DynSolValue],
    ) -> Result<DynSolValue, IndexerError> {
        self.read(kind, to, function, args)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| IndexerError::Decode(format!("{function}() returned nothing")))
    }

    async fn read_uint(
        &self,
        kind: InterfaceKind,
        to: &str,
        function: &str,
    ) -> Result<U256, IndexerError> {
        let value = self.read_one(kind, to, function, &[]).await?;
        normalizer::as_uint(&value)
            .ok_or_else(|| IndexerError::Decode(format!("{function}() is not an integer")))
    }

    pub async fn supports_interface(
        &self,
        to: &str,
        interface_id: [u8; 4],
    ) -> Result<bool, IndexerError> {
        let id = DynSolValue::FixedBytes(B256::right_padding_from(&interface_id), 4);
        let value = self
            .read_one(InterfaceKind::Probe, to, "supportsInterface", &[id])
            .await?;
        normalizer::as_bool(&value)
            .ok_or_else(|| IndexerError::Decode("supportsInterface() is not a bool".into()))
    }

    /// The contract's family tag string.
    pub async fn family_tag(&self, to: &str) -> Result<String, IndexerError> {
        let value = self
            .read_one(InterfaceKind::Probe, to, "getDkargoPrefix", &[])
            .await?;
        normalizer::as_string(&value)
            .ok_or_else(|| IndexerError::Decode("getDkargoPrefix() is not a string".into()))
    }

    // ─── Order ───────────────────────────────────────────────────────────────

    pub async fn order_id(&self, order: &str) -> Result<String, IndexerError> {
        Ok(self.read_uint(InterfaceKind::Order, order, "orderid").await?.to_string())
    }

    pub async fn tracking_count(&self, order: &str) -> Result<u64, IndexerError> {
        let count = self.read_uint(InterfaceKind::Order, order, "trackingCount").await?;
        u64::try_from(count)
            .map_err(|_| IndexerError::Decode(format!("tracking count {count} out of range")))
    }

    pub async fn is_complete(&self, order: &str) -> Result<bool, IndexerError> {
        let value = self.read_one(InterfaceKind::Order, order, "isComplete", &[]).await?;
        normalizer::as_bool(&value)
            .ok_or_else(|| IndexerError::Decode("isComplete() is not a bool".into()))
    }

    pub async fn tracking(&self, order: &str, index: u64) -> Result<TrackingEntry, IndexerError> {
        let values = self
            .read(
                InterfaceKind::Order,
                order,
                "tracking",
                &[DynSolValue::Uint(U256::from(index), 256)],
            )
            .await?;
        let field = |i: usize, what: &str| {
            values
                .get(i)
                .ok_or_else(|| IndexerError::Decode(format!("tracking({index}) missing {what}")))
        };
        let company = normalizer::as_address(field(1, "addr")?)
            .ok_or_else(|| IndexerError::Decode(format!("tracking({index}) addr is not an address")))?;
        Ok(TrackingEntry {
            company,
            code: normalizer::render(field(2, "code")?),
            incentives: normalizer::render(field(3, "incentives")?),
        })
    }

    // ─── Company ─────────────────────────────────────────────────────────────

    pub async fn company_name(&self, company: &str) -> Result<String, IndexerError> {
        let value = self.read_one(InterfaceKind::Company, company, "name", &[]).await?;
        normalizer::as_string(&value)
            .ok_or_else(|| IndexerError::Decode("name() is not a string".into()))
    }
}
